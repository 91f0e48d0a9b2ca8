//! # DevStudio Run Command
//!
//! File: cli/src/commands/run.rs
//!
//! ## Overview
//!
//! Implements `devstudio run`, which supervises an arbitrary shell command: its
//! merged output is streamed to stdout, status changes go to stderr, Ctrl-C
//! stops it, and the exit status reflects how it ended.
//!
//! ## Usage
//!
//! ```bash
//! devstudio run npm run build
//! devstudio run --timeout 60 --kill-after 5 "npm test -- --watch=false"
//! devstudio run --cwd functions npm install
//! ```
//!
//! Words after the flags are joined with spaces and handed to the shell as one
//! command line, so quoting inside a single argument is preserved.
//!
use crate::commands::session::{RunOptions, Session};
use crate::core::error::{Result, StudioError};
use anyhow::anyhow;
use clap::Parser;
use tracing::info;

/// Arguments for `devstudio run`.
#[derive(Parser, Debug)]
#[command(about = "Run a shell command under supervision")]
pub struct RunArgs {
    #[command(flatten)]
    options: RunOptions,

    /// The command line to run.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl RunArgs {
    fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Handler for `devstudio run`.
pub async fn handle_run(args: RunArgs) -> Result<()> {
    let command = args.command_line();
    if command.trim().is_empty() {
        return Err(anyhow!(StudioError::ArgumentParsing(
            "the command line is empty".to_string()
        )));
    }
    info!("Handling run command: {}", command);
    let session = Session::open(&args.options)?;
    session.execute(&command).await
}
