// src/exec/process.rs

//! Process handle abstraction owned by the stream reader worker.
//!
//! The worker talks to a [`ProcessHandle`] instead of a raw
//! `std::process::Child`, so tests can hand it a scripted fake while the
//! launcher hands it an [`OsProcess`]. Dropping the handle releases the
//! process resources; a [`ProcessTracker`] counts handles still alive.

use std::io::{self, Read};
use std::process::Child;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A running child process with redirected output streams.
pub trait ProcessHandle: Send + 'static {
    /// Take the stdout pipe. `None` once taken or if it was not redirected.
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Take the stderr pipe. `None` once taken or if it was not redirected.
    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>>;

    /// Block until the process exits and return its exit code.
    ///
    /// Processes terminated without an exit code (e.g. by a signal) report `-1`.
    fn wait_exit_code(&mut self) -> io::Result<i32>;

    /// Forcefully terminate the process.
    fn kill(&mut self) -> io::Result<()>;
}

/// Counts live process handles.
///
/// Every handle created by the launcher carries a [`LiveProcessGuard`]; the
/// count drops back when the worker releases the handle.
#[derive(Debug, Clone, Default)]
pub struct ProcessTracker {
    live: Arc<AtomicUsize>,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self) -> LiveProcessGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        LiveProcessGuard {
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct LiveProcessGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for LiveProcessGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A real OS child process.
///
/// Dropping it before the exit code was collected kills and reaps the child,
/// the same contract as `kill_on_drop(true)` on a Tokio command.
#[derive(Debug)]
pub struct OsProcess {
    child: Child,
    reaped: bool,
    _live: LiveProcessGuard,
}

impl OsProcess {
    pub fn new(child: Child, live: LiveProcessGuard) -> Self {
        Self {
            child,
            reaped: false,
            _live: live,
        }
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl ProcessHandle for OsProcess {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .stdout
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>)
    }

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        self.child
            .stderr
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>)
    }

    fn wait_exit_code(&mut self) -> io::Result<i32> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status.code().unwrap_or(-1))
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }
}

impl Drop for OsProcess {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
