//! # DevStudio Spawn Helpers (`common::process::spawn`)
//!
//! File: cli/src/common/process/spawn.rs
//!
//! ## Overview
//!
//! Everything the runner needs to turn a shell command string into a running
//! child whose stdout and stderr arrive on a single stream:
//!
//! - **`preflight`**: rejects a command before anything is spawned when the
//!   working directory is missing or the program it names cannot be found.
//!   The host shell would otherwise start fine and only complain through its
//!   own output, which would look like a normal failed run.
//! - **`spawn_merged`**: builds the shell invocation, creates one anonymous pipe,
//!   hands its write end to the child as both stdout and stderr, and returns the
//!   child together with an async reader over the read end.
//! - **`request_termination` / `force_kill`**: signal delivery used by the reader
//!   when a stop is requested.
//!
//! On unix the child leads its own process group, so signals reach the programs
//! the shell started as well as the shell itself.
//!
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Words the host shell resolves itself; these never need a PATH lookup.
const SHELL_BUILTINS: &[&str] = &[
    "!", ".", ":", "[", "[[", "alias", "bg", "break", "case", "cd", "command", "continue",
    "echo", "eval", "exec", "exit", "export", "false", "fg", "for", "function", "if", "jobs",
    "kill", "printf", "pwd", "read", "return", "set", "shift", "source", "test", "time", "trap",
    "true", "type", "ulimit", "umask", "unset", "until", "wait", "while", "{", "(",
];

/// Reasons a command is refused before or during spawning.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("working directory '{}' does not exist or is not a directory", .0.display())]
    BadWorkingDir(PathBuf),

    #[error("command not found: {0}")]
    ProgramNotFound(String),

    #[error("failed to spawn '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// The merged output stream of a spawned child.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Checks that `command` can plausibly be started in `working_dir`.
///
/// Only the first word is inspected (after any leading `NAME=value`
/// assignments). Anything the shell interprets itself passes; so does anything
/// containing shell syntax the simple word split cannot judge.
pub fn preflight(command: &str, working_dir: &Path) -> Result<(), SpawnError> {
    if command.trim().is_empty() {
        return Err(SpawnError::EmptyCommand);
    }
    if !working_dir.is_dir() {
        return Err(SpawnError::BadWorkingDir(working_dir.to_path_buf()));
    }

    let Some(program) = program_word(command) else {
        debug!("No program word to check in '{}'", command);
        return Ok(());
    };

    if SHELL_BUILTINS.contains(&program) || program.contains(['$', '`', '"', '\'', '*']) {
        return Ok(());
    }

    // Path-like programs are resolved against the working directory.
    if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
        let candidate = working_dir.join(shellexpand::tilde(program).as_ref());
        return if candidate.exists() {
            Ok(())
        } else {
            Err(SpawnError::ProgramNotFound(program.to_string()))
        };
    }

    match which::which(program) {
        Ok(path) => {
            debug!("Resolved '{}' to {}", program, path.display());
            Ok(())
        }
        Err(_) => Err(SpawnError::ProgramNotFound(program.to_string())),
    }
}

/// Characters that end a word for the shell: operators, redirections, subshells.
const WORD_BREAKS: &[char] = &[';', '&', '|', '<', '>', '(', ')'];

/// Returns the program `command` starts with, cut at the first operator.
///
/// `None` when there is nothing a PATH lookup could judge: no program word,
/// an operator right at the start of it, or a leading `PATH=` assignment the
/// shell would apply before looking the program up.
fn program_word(command: &str) -> Option<&str> {
    for word in command.split_whitespace() {
        let (head, broken) = match word.find(WORD_BREAKS) {
            Some(at) => (&word[..at], true),
            None => (word, false),
        };
        if is_assignment(head) {
            if broken || head.starts_with("PATH=") {
                return None;
            }
            continue;
        }
        return (!head.is_empty()).then_some(head);
    }
    None
}

fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !name.starts_with(|c: char| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Quotes `word` for a POSIX shell: wrapped in single quotes, embedded single
/// quotes written as `'\''`.
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Like `shell_quote`, but leaves words made only of safe characters untouched.
pub fn shell_word(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@%+=,".contains(c));
    if safe {
        word.to_string()
    } else {
        shell_quote(word)
    }
}

/// Spawns `command` through the host shell with stdout and stderr merged.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_merged(command: &str, working_dir: &Path) -> Result<(Child, OutputStream), SpawnError> {
    let io_err = |source: io::Error| SpawnError::Io {
        command: command.to_string(),
        source,
    };

    let (reader, writer) = io::pipe().map_err(io_err)?;
    let writer_for_stderr = writer.try_clone().map_err(io_err)?;

    // The Command holds the parent's copies of the write end; it is dropped at
    // the end of this block so the reader sees EOF once the child side closes.
    let child = {
        let mut cmd = shell_command(command, working_dir);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(writer))
            .stderr(Stdio::from(writer_for_stderr));
        cmd.spawn().map_err(io_err)?
    };

    let stream = output_stream(reader).map_err(io_err)?;
    debug!("Spawned '{}' with pid {:?}", command, child.id());
    Ok((child, stream))
}

/// Builds the host-shell invocation for `command` without configuring stdio.
pub fn shell_command(command: &str, working_dir: &Path) -> Command {
    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd.process_group(0);
        cmd
    };
    #[cfg(not(unix))]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    };
    cmd.current_dir(working_dir).kill_on_drop(true);
    cmd
}

#[cfg(unix)]
fn output_stream(reader: io::PipeReader) -> io::Result<OutputStream> {
    use std::os::fd::OwnedFd;
    let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
    Ok(Box::new(receiver))
}

#[cfg(windows)]
fn output_stream(reader: io::PipeReader) -> io::Result<OutputStream> {
    use std::os::windows::io::OwnedHandle;
    let file = std::fs::File::from(OwnedHandle::from(reader));
    Ok(Box::new(tokio::fs::File::from_std(file)))
}

/// Asks the child (and on unix its process group) to terminate.
pub fn request_termination(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        signal_group(child, nix::sys::signal::Signal::SIGTERM)
    }
    #[cfg(not(unix))]
    {
        child.start_kill()
    }
}

/// Kills the child (and on unix its process group) without grace.
pub fn force_kill(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        if let Err(e) = signal_group(child, nix::sys::signal::Signal::SIGKILL) {
            warn!("Group kill failed ({}), killing the direct child only", e);
        }
    }
    match child.start_kill() {
        // Already reaped: nothing left to kill.
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: nix::sys::signal::Signal) -> io::Result<()> {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        // Already reaped.
        return Ok(());
    };
    debug!("Sending {} to process group {}", signal, pid);
    killpg(Pid::from_raw(pid as i32), signal).map_err(io::Error::from)
}
