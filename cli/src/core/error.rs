//! # DevStudio Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used at the command layer of DevStudio.
//! The process runner itself never returns these: everything that goes wrong
//! while a child is spawned, read or reaped is reported as a `Message::Error`
//! on the runner's queue. Errors here cover the surrounding surface instead:
//! configuration, preferences, missing project files and runs that ended badly.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `StudioError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !project_file.exists() {
//!     return Err(StudioError::ProjectFile(format!("{} not found", project_file.display())))?;
//! }
//!
//! // Add context to errors using anyhow
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the DevStudio application.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Preferences error: {0}")]
    Preferences(String),

    #[error("Nothing selected: {0}")]
    NothingSelected(String),

    #[error("Project file missing: {0}")]
    ProjectFile(String),

    #[error("Command '{command}' did not complete: {status}")]
    RunFailed { command: String, status: String },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
