// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::RequestId;

#[derive(Error, Debug)]
pub enum ShellError {
    /// The child process could not be started.
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("working directory does not exist or is not a directory: {}", .0.display())]
    InvalidWorkingDirectory(PathBuf),

    #[error("invalid environment: {0}")]
    InvalidEnvironment(String),

    /// Reading a child's output failed mid-stream. Only ever reported through
    /// the log, never through the event queue.
    #[error("reading output of request {request} failed: {source}")]
    StreamRead {
        request: RequestId,
        #[source]
        source: std::io::Error,
    },

    /// A registered callback panicked while an event was being dispatched.
    #[error("dispatch to request {request} failed: {message}")]
    Dispatch { request: RequestId, message: String },

    #[error("request {request} already completed; event dropped")]
    RequestCompleted { request: RequestId },

    #[error("command `{command}` exited with non-zero code {code}")]
    NonZeroExit { command: String, code: i32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShellError {
    /// Exit code carried by a [`ShellError::NonZeroExit`], if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ShellError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
