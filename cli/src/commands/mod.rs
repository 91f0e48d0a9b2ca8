//! # DevStudio Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level subcommands of the DevStudio CLI. Each
//! one builds a single shell command line and hands it to a `session::Session`,
//! which supervises it through the process runner and the control loop.
//!
//! ## Commands
//!
//! - `run`: any shell command
//! - `emulators`: `firebase emulators:start` for a selection of emulators
//! - `deploy`: `firebase deploy` for hosting, functions or both
//! - `git`: status, pull, push and CI-trigger shortcuts
//! - `health`: the project's `check-system.sh` or `setup-secrets.sh`
//! - `last`: re-run the last issued command
//! - `info`: print the detected project facts (runs nothing)
//!
//! Every subcommand that runs something accepts the shared `--cwd`, `--timeout` and `--kill-after`
//! flags defined in `session::RunOptions`.
//!

/// Firebase deploy preset. Checks `firebase.json` before running.
pub mod deploy;
/// Firebase emulator suite preset.
pub mod emulators;
/// Git shortcuts (`status`, `pull`, `push`, `trigger-ci`).
pub mod git;
/// Project helper scripts (`check`, `secrets`).
pub mod health;
/// Detected public dir, repository, branch and aliases.
pub mod info;
/// Re-runs the command remembered in the preferences.
pub mod last;
/// Free-form command runner.
pub mod run;
/// Shared flags and the run-to-completion tail used by every command.
pub mod session;
