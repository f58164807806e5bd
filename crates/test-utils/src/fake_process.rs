use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shellpump::exec::{LiveProcessGuard, ProcessHandle, ProcessTracker};

/// Exit code a killed `FakeProcess` reports.
pub const KILLED_EXIT_CODE: i32 = -1;

/// A scripted process for driving `StreamReaderWorker` without an OS child.
///
/// - stdout/stderr are fixed byte buffers, optionally followed by a read error
/// - `wait_exit_code` returns the scripted code, or [`KILLED_EXIT_CODE`] once
///   killed
/// - when tracked, dropping it decrements the tracker like a real process
pub struct FakeProcess {
    stdout: Option<Box<dyn Read + Send>>,
    stderr: Option<Box<dyn Read + Send>>,
    exit_code: i32,
    killed: Arc<AtomicBool>,
    _live: Option<LiveProcessGuard>,
}

impl FakeProcess {
    pub fn new(stdout: &str, stderr: &str, exit_code: i32) -> Self {
        Self {
            stdout: Some(Box::new(Cursor::new(stdout.as_bytes().to_vec()))),
            stderr: Some(Box::new(Cursor::new(stderr.as_bytes().to_vec()))),
            exit_code,
            killed: Arc::new(AtomicBool::new(false)),
            _live: None,
        }
    }

    /// stdout yields `before_failure` and then fails with an I/O error.
    pub fn failing_stdout(before_failure: &str, stderr: &str, exit_code: i32) -> Self {
        let mut process = Self::new("", stderr, exit_code);
        process.stdout = Some(Box::new(FailingReader::new(before_failure)));
        process
    }

    /// stderr yields `before_failure` and then fails with an I/O error.
    pub fn failing_stderr(stdout: &str, before_failure: &str, exit_code: i32) -> Self {
        let mut process = Self::new(stdout, "", exit_code);
        process.stderr = Some(Box::new(FailingReader::new(before_failure)));
        process
    }

    /// Replace stdout with raw bytes, e.g. output that is not valid UTF-8.
    pub fn with_stdout_bytes(mut self, bytes: &[u8]) -> Self {
        self.stdout = Some(Box::new(Cursor::new(bytes.to_vec())));
        self
    }

    pub fn tracked(mut self, tracker: &ProcessTracker) -> Self {
        self._live = Some(tracker.track());
        self
    }

    /// Flag set once the worker kills this process.
    pub fn kill_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.killed)
    }
}

impl ProcessHandle for FakeProcess {
    fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout.take()
    }

    fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stderr.take()
    }

    fn wait_exit_code(&mut self) -> io::Result<i32> {
        if self.killed.load(Ordering::SeqCst) {
            Ok(KILLED_EXIT_CODE)
        } else {
            Ok(self.exit_code)
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl FailingReader {
    fn new(before_failure: &str) -> Self {
        Self {
            data: Cursor::new(before_failure.as_bytes().to_vec()),
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "simulated pipe failure",
            )),
            n => Ok(n),
        }
    }
}
