//! # DevStudio Process Runner (`common::process`)
//!
//! File: cli/src/common/process/mod.rs
//!
//! ## Overview
//!
//! This module supervises **at most one** external command at a time and
//! reports everything about it asynchronously. Commands are opaque shell
//! strings (`firebase emulators:start --only hosting`, `git pull --rebase`, ...)
//! run by the host shell with stdout and stderr merged into one stream.
//!
//! ## Architecture
//!
//! - **`ProcessRunner`** (this file): owns the queue, the lifecycle state and the
//!   handle of the current run. Exposes `start`, `stop` and `poll`; none of them
//!   block and none of them return errors.
//! - **`reader`**: the background task spawned per run. It alone reads the
//!   child's output and observes its exit, and it pushes `Message`s onto the
//!   queue in the order it learns things.
//! - **`message`**: the `Message`, `Status` and `RunnerState` types.
//! - **`spawn`**: shell invocation, output merging, preflight checks, signals.
//!
//! The queue is an unbounded Tokio MPSC channel. `start` pushes the
//! `running: <command>` status (or an error) itself; everything else comes from
//! the reader. Only the owner of the runner drains it, through `poll`.
//!
//! Each run gets an id. Messages are tagged with it internally so that a
//! terminal status still sitting in the queue from an earlier run cannot
//! overwrite the state of the run that replaced it.
//!
//! ## Usage
//!
//! ```rust
//! let mut runner = ProcessRunner::new(RunnerSettings::default());
//! runner.start("echo hello", Path::new("."));
//! // later, on every tick:
//! for message in runner.poll() {
//!     println!("{}", message);
//! }
//! ```
//!
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod message;
mod reader;
pub mod spawn;

pub use message::{ExitReason, Message, RunnerState, Status};
use reader::StopRequest;

/// Text of the error pushed when `start` is called while a run is active.
pub const ALREADY_RUNNING: &str = "Another process is running. Stop it first.";

/// Run id used for messages that do not belong to any run.
const NO_RUN: u64 = 0;

/// A message tagged with the run that produced it.
#[derive(Debug)]
pub struct Envelope {
    pub run: u64,
    pub message: Message,
}

/// Tunables for the runner.
#[derive(Debug, Clone, Default)]
pub struct RunnerSettings {
    /// After a stop request, force-kill the child if it is still alive this
    /// long afterwards. `None` keeps termination purely cooperative.
    pub kill_after: Option<Duration>,
}

/// Bookkeeping for the most recent successfully spawned run.
struct ActiveRun {
    id: u64,
    command: String,
    stop_tx: mpsc::UnboundedSender<StopRequest>,
    stop_sent: bool,
    reader: JoinHandle<()>,
}

/// Supervises zero or one external process.
pub struct ProcessRunner {
    settings: RunnerSettings,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
    state: RunnerState,
    next_run: u64,
    active: Option<ActiveRun>,
}

impl ProcessRunner {
    pub fn new(settings: RunnerSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            settings,
            tx,
            rx,
            state: RunnerState::Idle,
            next_run: NO_RUN + 1,
            active: None,
        }
    }

    /// The state as of the last `start`/`poll`.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// True while a spawned child has not yet produced its terminal status.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
            && self
                .active
                .as_ref()
                .is_some_and(|active| !active.reader.is_finished())
    }

    /// The command of the most recent spawned run, if any.
    pub fn current_command(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.command.as_str())
    }

    /// Starts `command` in `working_dir` unless a run is already active.
    ///
    /// Never fails: a rejected start or a spawn failure is pushed onto the queue
    /// as a `Message::Error`. Must be called from within a Tokio runtime.
    pub fn start(&mut self, command: &str, working_dir: &Path) {
        if self.is_running() {
            warn!(
                "Rejecting '{}': '{}' is still running",
                command,
                self.current_command().unwrap_or_default()
            );
            self.push(NO_RUN, Message::Error(ALREADY_RUNNING.to_string()));
            return;
        }

        let spawned = spawn::preflight(command, working_dir)
            .and_then(|()| spawn::spawn_merged(command, working_dir));
        let (child, output) = match spawned {
            Ok(spawned) => spawned,
            Err(e) => {
                warn!("Could not start '{}': {}", command, e);
                // A finished earlier run must not claim the state through a
                // terminal status still sitting in the queue.
                self.active = None;
                self.state = RunnerState::Idle;
                self.push(NO_RUN, Message::Error(e.to_string()));
                return;
            }
        };

        let run = self.next_run;
        self.next_run += 1;
        let (stop_tx, stop_rx) = mpsc::unbounded_channel();

        info!("Run {}: started '{}' in {}", run, command, working_dir.display());
        self.state = RunnerState::Running;
        self.push(run, Message::StatusChanged(Status::Running(command.to_string())));

        let ctx = reader::ReaderContext {
            run,
            tx: self.tx.clone(),
            stop_rx,
            kill_after: self.settings.kill_after,
        };
        let handle = tokio::spawn(reader::pump(child, output, ctx));

        // Any previous run already produced its terminal status (checked above).
        self.active = Some(ActiveRun {
            id: run,
            command: command.to_string(),
            stop_tx,
            stop_sent: false,
            reader: handle,
        });
    }

    /// Requests termination of the active run. Returns immediately.
    ///
    /// No-op (and no messages) when nothing is running or a stop was already
    /// requested. Returns whether a request was actually sent.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            debug!("Stop requested while idle, ignoring");
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.stop_sent {
            return false;
        }
        info!("Run {}: stop requested", active.id);
        active.stop_sent = true;
        // The reader may have finished in the meantime; that is fine.
        let _ = active.stop_tx.send(StopRequest::Terminate);
        true
    }

    /// Kills the active run without waiting for it to honour a stop.
    ///
    /// No-op when nothing is running. The run still ends with `terminated`
    /// once the reader has reaped the child.
    pub fn force_stop(&mut self) -> bool {
        if !self.is_running() {
            debug!("Kill requested while idle, ignoring");
            return false;
        }
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        info!("Run {}: kill requested", active.id);
        active.stop_sent = true;
        let _ = active.stop_tx.send(StopRequest::Kill);
        true
    }

    /// Drains every message currently queued, in arrival order. Never blocks.
    pub fn poll(&mut self) -> Vec<Message> {
        let mut drained = Vec::new();
        while let Ok(Envelope { run, message }) = self.rx.try_recv() {
            if let Some(status) = message.terminal_status() {
                let current = self.active.as_ref().map(|active| active.id);
                if current == Some(run) {
                    self.state = status.terminal_state();
                } else {
                    debug!("Terminal status of earlier run {} delivered late", run);
                }
            }
            drained.push(message);
        }
        drained
    }

    fn push(&self, run: u64, message: Message) {
        // The receiver lives in `self`, so the channel cannot be closed here.
        let _ = self.tx.send(Envelope { run, message });
    }
}
