//! # DevStudio Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! This module is the organizational entry point for the machinery shared by
//! every DevStudio command. Command handlers (`commands::`) only decide *what*
//! to run; this module decides *how* it runs and how it is shown.
//!
//! ## Architecture
//!
//! - **`process`**: the `ProcessRunner`. Spawns one shell command at a time with
//!   merged output, streams it back as messages through a queue, reports
//!   lifecycle transitions and honours cooperative stop requests.
//! - **`ui`**: the `ControlLoop` that drains the runner on a fixed tick and the
//!   `Surface` it renders onto.
//!
//! ```rust
//! use crate::common::{process, ui};
//! ```
//!

/// Supervision of a single external process with asynchronous output.
pub mod process;
/// Control loop and display surfaces.
pub mod ui;
