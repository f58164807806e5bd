// src/exec/mod.rs

//! Process execution layer.
//!
//! This module starts commands with `std::process::Command` and turns their
//! output into events on the shared [`crate::engine::EventQueue`].
//!
//! - [`launcher`] builds the shell invocation and starts the child.
//! - [`environment`] merges environment layers and probes `PATH`.
//! - [`process`] provides the [`ProcessHandle`] seam, the real [`OsProcess`]
//!   and the [`ProcessTracker`] used to confirm handles are released.
//! - [`worker`] is the per-command stream reader thread.

pub mod environment;
pub mod launcher;
pub mod process;
pub mod worker;

pub use environment::{command_exists, command_exists_in, merge_environment, resolve_overrides};
pub use launcher::{ProcessLauncher, ShellInvocation, shell_command};
pub use process::{LiveProcessGuard, OsProcess, ProcessHandle, ProcessTracker};
pub use worker::{StreamReaderWorker, spawn_worker};
