use std::fmt;

/// Identifier assigned to each command invocation, unique per [`crate::Shell`].
///
/// Only used for correlation in logs and errors; events carry the
/// [`crate::engine::RequestHandle`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which output channel a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    /// A line read from the child's stdout.
    Info,
    /// A line read from the child's stderr.
    Error,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Info => f.write_str("info"),
            LogKind::Error => f.write_str("error"),
        }
    }
}

/// A single event produced by a stream reader worker for one request.
///
/// Per request the order is always: every `InfoLog`, then every `ErrorLog`,
/// then exactly one `EndStream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    InfoLog(String),
    ErrorLog(String),
    EndStream(i32),
}

impl ShellEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShellEvent::EndStream(_))
    }
}
