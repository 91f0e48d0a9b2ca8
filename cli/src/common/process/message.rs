//! # DevStudio Runner Message Protocol (`common::process::message`)
//!
//! File: cli/src/common/process/message.rs
//!
//! ## Overview
//!
//! Defines the data that flows from the background reader to whoever drains the
//! runner's queue, plus the lifecycle states of the runner itself.
//!
//! - **`Message`**: one unit on the queue. `Output` carries a chunk of the child's
//!   merged stdout/stderr (normally one line, newline included), `StatusChanged`
//!   carries a lifecycle transition, `Error` carries a human-readable failure.
//! - **`Status`**: the payload of `StatusChanged`. Its `Display` form is the text a
//!   status line shows (`running: <command>`, `completed`, `failed: exit=3`, ...).
//! - **`ExitReason`**: why a run is considered failed.
//! - **`RunnerState`**: `Idle`, `Running`, or one of the three terminal states.
//!
//! A terminal `Status` (anything except `Running`) is always the last message a
//! run produces.
//!
use std::fmt;

/// A unit of information passed from the reader (or from `start`) to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A chunk of the child's merged output, in the order it was read.
    Output(String),
    /// A lifecycle transition of the current run.
    StatusChanged(Status),
    /// A failure reported as data: spawn errors, read errors, rejected starts.
    Error(String),
}

impl Message {
    /// Returns the terminal status carried by this message, if any.
    pub fn terminal_status(&self) -> Option<&Status> {
        match self {
            Message::StatusChanged(status) if status.is_terminal() => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Output(text) => write!(f, "{}", text),
            Message::StatusChanged(status) => write!(f, "{}", status),
            Message::Error(text) => write!(f, "{}", text),
        }
    }
}

/// Lifecycle transitions reported through `Message::StatusChanged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The child was spawned; carries the command string as given to `start`.
    Running(String),
    /// The child exited with code 0.
    Completed,
    /// The child exited unsuccessfully, or its exit could not be observed.
    Failed(ExitReason),
    /// The child ended after a stop request.
    Terminated,
}

impl Status {
    /// Whether this status ends a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running(_))
    }

    /// Maps a status to the runner state it puts the runner in.
    pub fn terminal_state(&self) -> RunnerState {
        match self {
            Status::Running(_) => RunnerState::Running,
            Status::Completed => RunnerState::Completed,
            Status::Failed(_) => RunnerState::Failed,
            Status::Terminated => RunnerState::Terminated,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running(command) => write!(f, "running: {}", command),
            Status::Completed => write!(f, "completed"),
            Status::Failed(reason) => write!(f, "failed: {}", reason),
            Status::Terminated => write!(f, "terminated"),
        }
    }
}

/// Why a run ended in `Status::Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Non-zero exit code.
    Exit(i32),
    /// Killed by a signal nobody asked for (unix only).
    Signal(i32),
    /// The exit status could not be observed.
    Unknown,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Exit(code) => write!(f, "exit={}", code),
            ExitReason::Signal(signal) => write!(f, "signal={}", signal),
            ExitReason::Unknown => write!(f, "exit=unknown"),
        }
    }
}

/// Lifecycle state of a `ProcessRunner`.
///
/// `Idle -> Running -> {Completed | Terminated | Failed}`; any terminal state
/// accepts a new `start`, which moves back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Completed,
    Terminated,
    Failed,
}

impl RunnerState {
    pub fn is_running(self) -> bool {
        self == RunnerState::Running
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunnerState::Idle => "idle",
            RunnerState::Running => "running",
            RunnerState::Completed => "completed",
            RunnerState::Terminated => "terminated",
            RunnerState::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}
