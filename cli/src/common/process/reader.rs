//! # DevStudio Background Reader (`common::process::reader`)
//!
//! File: cli/src/common/process/reader.rs
//!
//! ## Overview
//!
//! The reader is the task spawned once per run. It owns the child and the read
//! end of the merged output pipe, and it is the only code that reads the
//! child's output or observes its exit status. Everything it learns goes onto
//! the runner's queue as `Message`s, in the order it learned it.
//!
//! ## Lifecycle
//!
//! 1. Read the merged stream line by line, one `Output` per line.
//! 2. Meanwhile watch for the child's exit and for stop requests from the
//!    runner. `Terminate` sends SIGTERM (and, if configured, SIGKILL after a
//!    grace period); `Kill` sends SIGKILL right away.
//! 3. After the child exits, keep draining until EOF, but no longer than
//!    `OUTPUT_LINGER`: a background grandchild may hold the pipe open forever.
//! 4. Emit exactly one terminal `StatusChanged` and return.
//!
//! Read failures become an `Error` message and the reader still waits for the
//! exit. A failure to observe the exit ends the run as `failed: exit=unknown`.
//! Nothing in here panics or returns an error to its owner.
//!
use super::message::{ExitReason, Message, Status};
use super::spawn::{self, OutputStream};
use super::Envelope;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// How long output is still drained after the child itself has exited.
pub const OUTPUT_LINGER: Duration = Duration::from_millis(250);

/// What the runner asks of a live child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// Cooperative: SIGTERM, then SIGKILL after `kill_after` if configured.
    Terminate,
    /// SIGKILL now.
    Kill,
}

/// Everything a reader needs besides the child and its output stream.
pub struct ReaderContext {
    /// Identifier of the run, stamped on every message.
    pub run: u64,
    /// Producer side of the runner's queue.
    pub tx: mpsc::UnboundedSender<Envelope>,
    /// Stop requests from the runner. Closed when the runner is dropped.
    pub stop_rx: mpsc::UnboundedReceiver<StopRequest>,
    /// Grace period between SIGTERM and SIGKILL; `None` disables escalation.
    pub kill_after: Option<Duration>,
}

/// Drives one run to its terminal status.
pub async fn pump(mut child: Child, output: OutputStream, ctx: ReaderContext) {
    let ReaderContext {
        run,
        tx,
        mut stop_rx,
        kill_after,
    } = ctx;
    // A closed queue means the runner is gone; the messages have nowhere to go.
    let emit = |message: Message| {
        let _ = tx.send(Envelope { run, message });
    };

    let mut lines = BufReader::new(output);
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut stream_open = true;
    let mut exit: Option<io::Result<ExitStatus>> = None;
    let mut stop_open = true;
    let mut term_sent = false;
    let mut terminated_on_request = false;
    let mut kill_at: Option<Instant> = None;
    let mut linger_until: Option<Instant> = None;

    while stream_open || exit.is_none() {
        tokio::select! {
            read = lines.read_until(b'\n', &mut buf), if stream_open => match read {
                Ok(0) => {
                    flush_partial(&mut buf, &emit);
                    stream_open = false;
                    debug!("Run {}: output stream closed", run);
                }
                Ok(_) => {
                    emit(Message::Output(String::from_utf8_lossy(&buf).into_owned()));
                    buf.clear();
                }
                Err(e) => {
                    warn!("Run {}: failed reading output: {}", run, e);
                    flush_partial(&mut buf, &emit);
                    emit(Message::Error(format!("[reader error] {}", e)));
                    stream_open = false;
                }
            },
            status = child.wait(), if exit.is_none() => {
                debug!("Run {}: child exited with {:?}", run, status);
                if stream_open {
                    linger_until = Some(Instant::now() + OUTPUT_LINGER);
                }
                exit = Some(status);
            },
            request = stop_rx.recv(), if stop_open => {
                let request = request.unwrap_or_else(|| {
                    debug!("Run {}: runner dropped, stopping child", run);
                    stop_open = false;
                    StopRequest::Terminate
                });
                if exit.is_none() {
                    terminated_on_request = true;
                    match request {
                        StopRequest::Terminate if term_sent => {
                            debug!("Run {}: termination already requested", run);
                        }
                        StopRequest::Terminate => {
                            term_sent = true;
                            info!("Run {}: stop requested, sending termination signal", run);
                            if let Err(e) = spawn::request_termination(&mut child) {
                                warn!("Run {}: termination signal failed: {}", run, e);
                            }
                            kill_at = kill_after.map(|grace| Instant::now() + grace);
                        }
                        StopRequest::Kill => {
                            kill_at = None;
                            warn!("Run {}: kill requested", run);
                            if let Err(e) = spawn::force_kill(&mut child) {
                                warn!("Run {}: kill failed: {}", run, e);
                            }
                        }
                    }
                }
            },
            _ = sleep_until(kill_at.unwrap_or_else(Instant::now)), if kill_at.is_some() && exit.is_none() => {
                kill_at = None;
                warn!("Run {}: child ignored termination, killing it", run);
                if let Err(e) = spawn::force_kill(&mut child) {
                    warn!("Run {}: kill failed: {}", run, e);
                }
            },
            _ = sleep_until(linger_until.unwrap_or_else(Instant::now)), if linger_until.is_some() && stream_open => {
                debug!("Run {}: output still open after exit, abandoning it", run);
                flush_partial(&mut buf, &emit);
                stream_open = false;
            },
        }
    }

    let terminal = match exit {
        Some(Ok(status)) => classify(status, terminated_on_request),
        Some(Err(e)) => {
            emit(Message::Error(format!("[reader error] could not observe exit: {}", e)));
            Status::Failed(ExitReason::Unknown)
        }
        None => Status::Failed(ExitReason::Unknown),
    };
    info!("Run {} finished: {}", run, terminal);
    emit(Message::StatusChanged(terminal));
}

/// Emits whatever sits in `buf` (a last line without a newline) and clears it.
fn flush_partial(buf: &mut Vec<u8>, emit: &impl Fn(Message)) {
    if !buf.is_empty() {
        emit(Message::Output(String::from_utf8_lossy(buf).into_owned()));
        buf.clear();
    }
}

/// Turns an exit status into the run's terminal status.
fn classify(status: ExitStatus, terminated_on_request: bool) -> Status {
    if terminated_on_request {
        return Status::Terminated;
    }
    if status.success() {
        return Status::Completed;
    }
    if let Some(code) = status.code() {
        return Status::Failed(ExitReason::Exit(code));
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Status::Failed(ExitReason::Signal(signal));
        }
    }
    Status::Failed(ExitReason::Unknown)
}

// --- Unit Tests ---
#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;

    #[test]
    fn test_classify_exit_codes() {
        assert_eq!(classify(ExitStatus::from_raw(0), false), Status::Completed);
        assert_eq!(
            classify(ExitStatus::from_raw(3 << 8), false),
            Status::Failed(ExitReason::Exit(3))
        );
        assert_eq!(
            classify(ExitStatus::from_raw(9), false),
            Status::Failed(ExitReason::Signal(9))
        );
    }

    #[test]
    fn test_classify_stop_request_wins() {
        assert_eq!(classify(ExitStatus::from_raw(15), true), Status::Terminated);
        assert_eq!(classify(ExitStatus::from_raw(0), true), Status::Terminated);
    }

    #[test]
    fn test_flush_partial_emits_once() {
        let seen = std::cell::RefCell::new(Vec::new());
        let emit = |m: Message| seen.borrow_mut().push(m);
        let mut buf = b"no newline".to_vec();
        flush_partial(&mut buf, &emit);
        flush_partial(&mut buf, &emit);
        assert!(buf.is_empty());
        assert_eq!(
            seen.into_inner(),
            vec![Message::Output("no newline".to_string())]
        );
    }
}
