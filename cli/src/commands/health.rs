//! # DevStudio Health Command
//!
//! File: cli/src/commands/health.rs
//!
//! ## Overview
//!
//! Implements `devstudio health`, which runs one of the project's own helper
//! scripts from the working directory under supervision:
//!
//! - `check` (default): `./check-system.sh`
//! - `secrets`: `./setup-secrets.sh`
//!
//! A missing script is reported as a spawn error before anything runs.
//!
//! ## Usage
//!
//! ```bash
//! devstudio health
//! devstudio health secrets --cwd site
//! ```
//!
use crate::commands::session::{RunOptions, Session};
use crate::core::error::Result;
use clap::{Parser, ValueEnum};
use tracing::info;

/// Which project script to run.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HealthScript {
    /// Check the local toolchain.
    #[default]
    Check,
    /// Set up the project's secrets.
    Secrets,
}

impl HealthScript {
    pub fn command(self) -> &'static str {
        match self {
            HealthScript::Check => "./check-system.sh",
            HealthScript::Secrets => "./setup-secrets.sh",
        }
    }
}

/// Arguments for `devstudio health`.
#[derive(Parser, Debug)]
#[command(about = "Run the project's system check or secrets setup script")]
pub struct HealthArgs {
    #[arg(value_enum, default_value_t = HealthScript::Check)]
    script: HealthScript,

    #[command(flatten)]
    options: RunOptions,
}

/// Handler for `devstudio health`.
pub async fn handle_health(args: HealthArgs) -> Result<()> {
    let session = Session::open(&args.options)?;
    info!("Running {:?} script", args.script);
    session.execute(args.script.command()).await
}
