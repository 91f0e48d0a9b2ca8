//! # DevStudio Run Session
//!
//! File: cli/src/commands/session.rs
//!
//! ## Overview
//!
//! Every subcommand ends the same way: one shell command is handed to a
//! `ControlLoop` on the terminal, driven until it finishes, and its terminal
//! status is turned into the process exit status. This module holds that shared
//! tail so the subcommands only have to build their command string.
//!
//! ## Architecture
//!
//! - `RunOptions`: the flags every subcommand accepts (`--cwd`, `--timeout`,
//!   `--kill-after`), flattened into each subcommand's arguments.
//! - `Session::open`: loads configuration, resolves the working directory and
//!   loads the preferences stored there.
//! - `Session::execute`: records the command in the preferences, runs it and
//!   maps the outcome:
//!     * `completed`, or `terminated` by the user (Ctrl-C) -> `Ok(())`
//!     * `failed`, stopped by the timeout, or never started -> `StudioError::RunFailed`
//!
use crate::common::process::{ProcessRunner, RunnerSettings, RunnerState, Status};
use crate::common::ui::{ControlLoop, RunReport, TerminalSurface};
use crate::core::config::{self, Config};
use crate::core::error::{Result, StudioError};
use crate::core::prefs::Preferences;
use anyhow::{anyhow, Context};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Flags shared by every subcommand that runs something.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory to run in. Defaults to `runner.working_dir`, then the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Stop the command after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// After a stop, force-kill the command if it is still alive this many seconds later.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub kill_after: Option<u64>,
}

/// Configuration, working directory and preferences for one invocation.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub working_dir: PathBuf,
    pub prefs: Preferences,
    timeout: Option<Duration>,
    kill_after: Option<Duration>,
}

impl Session {
    /// Loads everything a run needs, applying `options` over the configuration.
    pub fn open(options: &RunOptions) -> Result<Self> {
        let config = config::load_config()?;
        Self::with_config(config, options)
    }

    /// Like `open`, with an already loaded configuration.
    pub fn with_config(config: Config, options: &RunOptions) -> Result<Self> {
        let working_dir = match (&options.cwd, &config.runner.working_dir) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => PathBuf::from(dir),
            (None, None) => std::env::current_dir().context("Failed to get current directory")?,
        };
        if !working_dir.is_dir() {
            return Err(anyhow!(StudioError::FileSystem(format!(
                "working directory '{}' does not exist or is not a directory",
                working_dir.display()
            ))));
        }
        let timeout = options
            .timeout
            .map(Duration::from_secs)
            .or(config.runner.timeout());
        let kill_after = options
            .kill_after
            .map(Duration::from_secs)
            .or(config.runner.kill_after());
        let prefs = Preferences::load(&working_dir);
        debug!(
            "Session in {} (timeout {:?}, kill after {:?})",
            working_dir.display(),
            timeout,
            kill_after
        );
        Ok(Self {
            config,
            working_dir,
            prefs,
            timeout,
            kill_after,
        })
    }

    /// Writes the preferences back. A failure is only worth a warning.
    pub fn save_prefs(&self) {
        if let Err(e) = self.prefs.save(&self.working_dir) {
            warn!("Could not save preferences: {:#}", e);
        }
    }

    /// Runs `command` to completion on the terminal.
    pub async fn execute(mut self, command: &str) -> Result<()> {
        self.prefs.record_command(command);
        self.save_prefs();

        let runner = ProcessRunner::new(RunnerSettings {
            kill_after: self.kill_after,
        });
        let mut control = ControlLoop::new(
            runner,
            TerminalSurface::stdio(),
            self.config.runner.tick_interval(),
        );

        if !control.issue_start(command, &self.working_dir) {
            return Err(anyhow!(StudioError::RunFailed {
                command: command.to_string(),
                status: "not started".to_string(),
            }));
        }
        let report = control.run_until_idle(self.timeout).await;
        judge(command, report, control.last_status(), self.timeout)
    }
}

/// Maps the end of a run to the result of the invocation.
fn judge(
    command: &str,
    report: RunReport,
    last_status: Option<&Status>,
    timeout: Option<Duration>,
) -> Result<()> {
    let failed = |status: String| {
        Err(anyhow!(StudioError::RunFailed {
            command: command.to_string(),
            status,
        }))
    };
    if report.timed_out {
        let limit = timeout.map(|t| t.as_secs()).unwrap_or_default();
        return failed(format!("timed out after {}s", limit));
    }
    match report.state {
        RunnerState::Completed => Ok(()),
        RunnerState::Terminated => {
            info!("'{}' stopped on request", command);
            Ok(())
        }
        RunnerState::Failed => failed(
            last_status
                .map(ToString::to_string)
                .unwrap_or_else(|| report.state.to_string()),
        ),
        state => failed(state.to_string()),
    }
}
