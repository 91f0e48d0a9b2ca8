//! # DevStudio Last Command
//!
//! File: cli/src/commands/last.rs
//!
//! ## Overview
//!
//! Implements `devstudio last`, which re-runs the last command issued from the
//! working directory, as remembered in `.devstudio-prefs.toml`. With `--print`
//! it only shows the command (handy for copying it into another terminal).
//!
//! ## Usage
//!
//! ```bash
//! devstudio last
//! devstudio last --print
//! ```
//!
use crate::commands::session::{RunOptions, Session};
use crate::core::error::{Result, StudioError};
use anyhow::anyhow;
use clap::Parser;

/// Arguments for `devstudio last`.
#[derive(Parser, Debug)]
#[command(about = "Re-run the last issued command")]
pub struct LastArgs {
    /// Print the command instead of running it.
    #[arg(long)]
    print: bool,

    #[command(flatten)]
    options: RunOptions,
}

/// Handler for `devstudio last`.
pub async fn handle_last(args: LastArgs) -> Result<()> {
    let session = Session::open(&args.options)?;
    let Some(command) = session.prefs.last_command.clone() else {
        return Err(anyhow!(StudioError::NothingSelected(format!(
            "no command has been run in {} yet",
            session.working_dir.display()
        ))));
    };

    if args.print {
        println!("{}", command);
        if let Some(at) = session.prefs.last_run_at {
            eprintln!("last run {}", at.to_rfc3339());
        }
        return Ok(());
    }
    session.execute(&command).await
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_args_parsing() {
        let args = LastArgs::try_parse_from(["last", "--print", "--cwd", "site"]).unwrap();
        assert!(args.print);
        assert_eq!(args.options.cwd, Some(std::path::PathBuf::from("site")));

        let args = LastArgs::try_parse_from(["last"]).unwrap();
        assert!(!args.print);
    }
}
