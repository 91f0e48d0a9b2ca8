//! # DevStudio Info Command
//!
//! File: cli/src/commands/info.rs
//!
//! ## Overview
//!
//! Implements `devstudio info`, which prints what DevStudio detects about the
//! working directory: the hosting public directory, the GitHub repository and
//! its Actions page, the current branch and the Firebase project aliases.
//! Nothing is run and nothing is remembered.
//!
//! ## Usage
//!
//! ```bash
//! devstudio info
//! devstudio info --cwd site
//! ```
//!
use crate::commands::session::{RunOptions, Session};
use crate::core::error::Result;
use crate::core::project::ProjectInfo;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for `devstudio info`.
#[derive(Parser, Debug)]
#[command(about = "Show the detected public dir, repository, branch and aliases")]
pub struct InfoArgs {
    /// Directory to inspect. Defaults to `runner.working_dir`, then the current directory.
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,
}

/// Handler for `devstudio info`.
pub async fn handle_info(args: InfoArgs) -> Result<()> {
    let options = RunOptions {
        cwd: args.cwd,
        ..Default::default()
    };
    let session = Session::open(&options)?;
    let info = ProjectInfo::detect(&session.working_dir).await;
    println!("{}", info);
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_args_parsing() {
        let args = InfoArgs::try_parse_from(["info", "--cwd", "site"]).unwrap();
        assert_eq!(args.cwd, Some(PathBuf::from("site")));
        assert!(InfoArgs::try_parse_from(["info", "--timeout", "5"]).is_err());
    }
}
