//! # DevStudio Display Surfaces (`common::ui::surface`)
//!
//! File: cli/src/common/ui/surface.rs
//!
//! ## Overview
//!
//! A `Surface` is wherever the control loop renders what the runner reports: a
//! log area that text is appended to, and a single status line. The terminal
//! implementation writes the child's output to stdout untouched and everything
//! DevStudio says itself (command echo, warnings, errors, status changes) to
//! stderr, so `devstudio run ... > out.log` captures exactly the child's output.
//!
use std::io::{self, Write};

/// How an appended piece of text should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Output of the child, shown verbatim.
    Plain,
    /// Echo of the command being started.
    Command,
    /// Something the user should notice but that is not a failure.
    Warning,
    /// A failure reported by the runner.
    Error,
}

/// A display/command surface driven by the control loop.
pub trait Surface {
    /// Appends `text` to the log area.
    fn append(&mut self, text: &str, tone: Tone);
    /// Replaces the status line.
    fn set_status(&mut self, text: &str);
}

/// Renders to a pair of writers: child output to `out`, everything else to `err`.
pub struct TerminalSurface<O: Write, E: Write> {
    out: O,
    err: E,
}

impl TerminalSurface<io::Stdout, io::Stderr> {
    /// A surface on the process's stdout and stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalSurface<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    #[cfg(test)]
    fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    fn line(&mut self, prefix: &str, text: &str) {
        let text = text.trim_end_matches('\n');
        // A closed terminal is not worth failing a run over.
        let _ = writeln!(self.err, "{}{}", prefix, text);
        let _ = self.err.flush();
    }
}

impl<O: Write, E: Write> Surface for TerminalSurface<O, E> {
    fn append(&mut self, text: &str, tone: Tone) {
        match tone {
            Tone::Plain => {
                let _ = self.out.write_all(text.as_bytes());
                let _ = self.out.flush();
            }
            Tone::Command => self.line("$ ", text),
            Tone::Warning => self.line("[warn] ", text),
            Tone::Error => self.line("[error] ", text),
        }
    }

    fn set_status(&mut self, text: &str) {
        self.line("[status] ", text);
    }
}

/// Keeps everything in memory; used to check what the control loop rendered.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub entries: Vec<(Tone, String)>,
    pub statuses: Vec<String>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn texts(&self, tone: Tone) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, text)| text.as_str())
            .collect()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn append(&mut self, text: &str, tone: Tone) {
        self.entries.push((tone, text.to_string()));
    }

    fn set_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }
}
