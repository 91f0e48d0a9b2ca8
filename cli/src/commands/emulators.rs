//! # DevStudio Emulators Command
//!
//! File: cli/src/commands/emulators.rs
//!
//! ## Overview
//!
//! Implements `devstudio emulators`, which starts the Firebase Local Emulator
//! Suite for a chosen set of emulators and keeps it supervised until it exits
//! or is stopped with Ctrl-C.
//!
//! The selection comes from, in order: `--only`, the selection remembered in
//! the preferences file, the `[emulators]` configuration section.
//!
//! ## Usage
//!
//! ```bash
//! devstudio emulators                         # configured/remembered selection
//! devstudio emulators --only hosting,firestore
//! devstudio emulators --only auth --save      # also remember the selection
//! ```
//!
use crate::commands::session::{RunOptions, Session};
use crate::core::config::EmulatorConfig;
use crate::core::error::{Result, StudioError};
use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use tracing::info;

/// One emulator of the suite.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emulator {
    Hosting,
    Functions,
    Firestore,
    Auth,
}

/// Arguments for `devstudio emulators`.
#[derive(Parser, Debug)]
#[command(about = "Start the Firebase emulators")]
pub struct EmulatorsArgs {
    /// Comma-separated emulators to start.
    #[arg(long, value_enum, value_delimiter = ',', value_name = "LIST")]
    only: Option<Vec<Emulator>>,

    /// Remember this selection for later runs.
    #[arg(long)]
    save: bool,

    #[command(flatten)]
    options: RunOptions,
}

/// Builds the selection named by `--only`.
fn selection_from(list: &[Emulator]) -> EmulatorConfig {
    EmulatorConfig {
        hosting: list.contains(&Emulator::Hosting),
        functions: list.contains(&Emulator::Functions),
        firestore: list.contains(&Emulator::Firestore),
        auth: list.contains(&Emulator::Auth),
    }
}

/// Builds `firebase emulators:start --only <csv>` for `selection`.
///
/// The list is always in `hosting,functions,firestore,auth` order.
pub fn emulators_command(selection: &EmulatorConfig) -> Result<String> {
    let only: Vec<&str> = [
        (selection.hosting, "hosting"),
        (selection.functions, "functions"),
        (selection.firestore, "firestore"),
        (selection.auth, "auth"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();

    if only.is_empty() {
        return Err(anyhow!(StudioError::NothingSelected(
            "select at least one emulator".to_string()
        )));
    }
    Ok(format!("firebase emulators:start --only {}", only.join(",")))
}

/// Handler for `devstudio emulators`.
pub async fn handle_emulators(args: EmulatorsArgs) -> Result<()> {
    let mut session = Session::open(&args.options)?;
    let selection = match &args.only {
        Some(list) => selection_from(list),
        None => session.prefs.emulators.unwrap_or(session.config.emulators),
    };
    let command = emulators_command(&selection)?;
    if args.save {
        info!("Remembering emulator selection {:?}", selection);
        session.prefs.emulators = Some(selection);
    }
    session.execute(&command).await
}
