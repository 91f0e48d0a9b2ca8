//! # DevStudio Control Loop (`common::ui::control`)
//!
//! File: cli/src/common/ui/control.rs
//!
//! ## Overview
//!
//! The control loop bridges the asynchronous `ProcessRunner` and a synchronous
//! `Surface`. It is the only consumer of the runner's queue.
//!
//! - **`tick`**: drains whatever the runner has queued and renders it. Never
//!   blocks and costs next to nothing when the queue is empty, so it can be
//!   called from any timer: a UI event loop, a test, or `run_until_idle`.
//! - **`issue_start` / `issue_stop`**: thin pass-throughs to the runner that also
//!   echo to the surface and remember the last command issued.
//! - **`interrupt`**: what Ctrl-C does. The first one asks for a stop, any
//!   further one kills the run outright.
//! - **`run_until_idle`**: the headless driver used by the CLI. Ticks on a
//!   `tokio::time::interval`, turns Ctrl-C and an optional timeout into stop
//!   requests, and returns once the run has reached its terminal status.
//!
//! ## Phases
//!
//! `Ready -> Busy` when a start is accepted, `Busy -> Ready` once the terminal
//! status has been rendered. A start issued while `Busy` is refused with a
//! warning on the surface; the running process is left alone.
//!
use crate::common::process::{Message, ProcessRunner, RunnerState, Status, ALREADY_RUNNING};
use crate::common::ui::surface::{Surface, Tone};
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default tick interval, matching a responsive terminal or window refresh.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Whether the loop can accept a new start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Busy,
}

/// Outcome of `run_until_idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Runner state after the terminal status was rendered.
    pub state: RunnerState,
    /// Whether the configured timeout fired and triggered the stop.
    pub timed_out: bool,
}

/// Drives a `ProcessRunner` and renders its messages onto a `Surface`.
pub struct ControlLoop<S: Surface> {
    runner: ProcessRunner,
    surface: S,
    tick_interval: Duration,
    last_command: Option<String>,
    last_status: Option<Status>,
    interrupts: u32,
}

impl<S: Surface> ControlLoop<S> {
    pub fn new(runner: ProcessRunner, surface: S, tick_interval: Duration) -> Self {
        Self {
            runner,
            surface,
            tick_interval,
            last_command: None,
            last_status: None,
            interrupts: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.runner.state().is_running() {
            Phase::Busy
        } else {
            Phase::Ready
        }
    }

    /// The most recent command handed to `issue_start`, accepted or not.
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// The last status rendered on the status line.
    pub fn last_status(&self) -> Option<&Status> {
        self.last_status.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Drains and renders every queued message. Returns how many were rendered.
    pub fn tick(&mut self) -> usize {
        let messages = self.runner.poll();
        for message in &messages {
            self.render(message);
        }
        messages.len()
    }

    fn render(&mut self, message: &Message) {
        match message {
            Message::Output(text) => self.surface.append(text, Tone::Plain),
            Message::StatusChanged(status) => {
                self.surface.set_status(&status.to_string());
                self.last_status = Some(status.clone());
            }
            Message::Error(text) => self.surface.append(text, Tone::Error),
        }
    }

    /// Starts `command` unless a run is in progress. Returns whether it started.
    pub fn issue_start(&mut self, command: &str, working_dir: &Path) -> bool {
        // Render anything pending first so a finished run frees the loop.
        self.tick();
        self.last_command = Some(command.to_string());

        if self.phase() == Phase::Busy {
            warn!("Start of '{}' refused: a run is in progress", command);
            self.surface.append(ALREADY_RUNNING, Tone::Warning);
            return false;
        }

        self.surface.append(command, Tone::Command);
        self.interrupts = 0;
        self.runner.start(command, working_dir);
        // A spawn failure is already queued; show it right away.
        self.tick();
        self.runner.state().is_running()
    }

    /// Requests a stop of the current run. Returns whether a request was sent.
    pub fn issue_stop(&mut self) -> bool {
        let requested = self.runner.stop();
        if requested {
            self.surface.append("stop requested", Tone::Warning);
        }
        requested
    }

    /// Handles one user interrupt. The first asks the run to stop, later ones
    /// kill it. Returns whether anything was sent to the runner.
    pub fn interrupt(&mut self) -> bool {
        if self.phase() == Phase::Ready {
            return false;
        }
        self.interrupts += 1;
        if self.interrupts == 1 {
            // After a timeout has already asked, the first one kills.
            if self.issue_stop() {
                return true;
            }
        }
        let killed = self.runner.force_stop();
        if killed {
            warn!("Interrupted again, killing the run");
            self.surface.append("killing", Tone::Warning);
        }
        killed
    }

    /// Ticks until the current run has rendered its terminal status.
    ///
    /// `timeout`, when set, triggers one `issue_stop` at the deadline. Each
    /// Ctrl-C goes through `interrupt`. Returns immediately when nothing is
    /// running.
    pub async fn run_until_idle(&mut self, timeout: Option<Duration>) -> RunReport {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = timeout.map(|limit| Instant::now() + limit);
        let mut deadline_fired = false;
        let mut timed_out = false;
        let mut ctrl_c = Box::pin(tokio::signal::ctrl_c());
        let mut listening = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                    if self.phase() == Phase::Ready {
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() && !deadline_fired => {
                    deadline_fired = true;
                    if self.issue_stop() {
                        timed_out = true;
                        if let Some(limit) = timeout {
                            info!("Timeout of {:?} reached, stopping", limit);
                            self.surface.append(
                                &format!("timed out after {}s", limit.as_secs_f64()),
                                Tone::Warning,
                            );
                        }
                    }
                },
                signal = &mut ctrl_c, if listening => {
                    match signal {
                        Ok(()) => {
                            debug!("Ctrl-C received");
                            self.interrupt();
                            ctrl_c = Box::pin(tokio::signal::ctrl_c());
                        }
                        Err(e) => {
                            listening = false;
                            warn!("Could not listen for Ctrl-C: {}", e);
                        }
                    }
                },
            }
        }

        RunReport {
            state: self.runner.state(),
            timed_out,
        }
    }
}
