//! # DevStudio UI Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Everything between the process runner and the person watching it:
//!
//! - **`surface`**: the `Surface` trait (an append-only log plus a status line)
//!   and its terminal implementation.
//! - **`control`**: the `ControlLoop`, which periodically drains the runner's
//!   queue onto a surface and forwards start/stop intents to the runner.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::process::{ProcessRunner, RunnerSettings};
//! use crate::common::ui::{ControlLoop, TerminalSurface, DEFAULT_TICK_INTERVAL};
//!
//! # async fn run_example() {
//! let runner = ProcessRunner::new(RunnerSettings::default());
//! let mut control = ControlLoop::new(runner, TerminalSurface::stdio(), DEFAULT_TICK_INTERVAL);
//! control.issue_start("git status", std::path::Path::new("."));
//! let report = control.run_until_idle(None).await;
//! # }
//! ```
//!

/// The periodic consumer of the runner's queue.
pub mod control;
/// Display surfaces the control loop renders onto.
pub mod surface;

pub use control::{ControlLoop, RunReport, DEFAULT_TICK_INTERVAL};
pub use surface::TerminalSurface;
