// src/printer.rs

//! Line output for the `run` subcommand.

use std::io::Write;

use tracing::debug;

/// Writes labelled lines to `W`.
///
/// The first write error (typically a closed pipe) is logged at `debug` and
/// every later line is dropped.
pub struct LinePrinter<W> {
    writer: W,
    label: String,
    failed: bool,
}

impl<W: Write> LinePrinter<W> {
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
            failed: false,
        }
    }

    pub fn print(&mut self, line: &str) {
        if self.failed {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{}{line}", self.label) {
            debug!(error = %err, label = %self.label, "output closed; dropping further lines");
            self.failed = true;
        }
    }

    /// Whether a write has failed and printing stopped.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
