// src/exec/worker.rs

//! Stream reader worker: turns a child's output into queued events.
//!
//! One worker thread runs per launched command. It reads stdout to the end,
//! then stderr, then collects the exit code, and enqueues:
//! - `InfoLog` for every stdout line (empty lines included),
//! - `ErrorLog` for every non-empty stderr line,
//! - exactly one `EndStream(exit_code)`, last.
//!
//! Stderr is buffered by a collector thread while stdout is being read, so a
//! child filling its stderr pipe cannot stall the stdout read. Delivery order
//! is unchanged: stderr lines are only enqueued once stdout has ended, which
//! means they may arrive later than they were written.
//!
//! If reading fails, the lines read so far are still enqueued, the error
//! goes to the log (never into the queue), the child is killed and reaped,
//! and `EndStream` is still enqueued so the request always reaches its
//! terminal state.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::engine::{EventQueue, RequestHandle};
use crate::errors::ShellError;
use crate::exec::process::ProcessHandle;
use crate::types::ShellEvent;

/// Exit code reported when the real one could not be collected.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

pub struct StreamReaderWorker<P: ProcessHandle> {
    request: RequestHandle,
    process: P,
    queue: Arc<EventQueue>,
}

impl<P: ProcessHandle> StreamReaderWorker<P> {
    pub fn new(request: RequestHandle, process: P, queue: Arc<EventQueue>) -> Self {
        Self {
            request,
            process,
            queue,
        }
    }

    /// Run the worker to completion on the current thread.
    ///
    /// The process handle is released (dropped) after `EndStream` has been
    /// enqueued, on both the normal and the failure path.
    pub fn run(self) {
        let StreamReaderWorker {
            request,
            mut process,
            queue,
        } = self;
        let id = request.id();

        let exit_code = match read_streams(&request, &mut process, &queue) {
            Ok(()) => process.wait_exit_code().unwrap_or_else(|source| {
                let err = ShellError::StreamRead { request: id, source };
                error!(request = %id, error = %err, "failed to collect exit code");
                UNKNOWN_EXIT_CODE
            }),
            Err(source) => {
                let err = ShellError::StreamRead { request: id, source };
                error!(request = %id, cmd = %request.command(), error = %err, "shell execute failed");

                if let Err(e) = process.kill() {
                    debug!(request = %id, error = %e, "kill after read failure failed; process may have exited");
                }
                process.wait_exit_code().unwrap_or(UNKNOWN_EXIT_CODE)
            }
        };

        queue.enqueue(&request, ShellEvent::EndStream(exit_code));
        drop(process);

        debug!(request = %id, exit_code, "stream reader finished; process released");
    }
}

/// Spawn a dedicated worker thread for one request.
///
/// If the thread cannot be spawned the process handle is dropped with the
/// closure, and the error is returned to the launcher.
pub fn spawn_worker<P: ProcessHandle>(
    request: RequestHandle,
    process: P,
    queue: Arc<EventQueue>,
) -> io::Result<JoinHandle<()>> {
    let name = format!("shellpump-worker-{}", request.id().0);
    let worker = StreamReaderWorker::new(request, process, queue);
    thread::Builder::new().name(name).spawn(move || worker.run())
}

fn read_streams<P: ProcessHandle>(
    request: &RequestHandle,
    process: &mut P,
    queue: &EventQueue,
) -> io::Result<()> {
    let stderr = match process.take_stderr() {
        Some(stderr) => Some(spawn_stderr_collector(request, stderr)?),
        None => None,
    };

    if let Some(stdout) = process.take_stdout() {
        for_each_line(stdout, |line| {
            queue.enqueue(request, ShellEvent::InfoLog(line));
        })?;
    }

    if let Some(collector) = stderr {
        let captured = collector
            .join()
            .map_err(|_| io::Error::other("stderr reader thread panicked"))?;
        for line in captured.lines {
            queue.enqueue(request, ShellEvent::ErrorLog(line));
        }
        if let Some(err) = captured.error {
            return Err(err);
        }
    }

    Ok(())
}

/// Stderr lines read before the pipe ended or failed.
struct StderrCapture {
    lines: Vec<String>,
    error: Option<io::Error>,
}

fn spawn_stderr_collector(
    request: &RequestHandle,
    stderr: Box<dyn Read + Send>,
) -> io::Result<JoinHandle<StderrCapture>> {
    thread::Builder::new()
        .name(format!("shellpump-stderr-{}", request.id().0))
        .spawn(move || {
            let mut lines = Vec::new();
            let error = for_each_line(stderr, |line| {
                if !line.is_empty() {
                    lines.push(line);
                }
            })
            .err();
            StderrCapture { lines, error }
        })
}

/// Call `f` for every line of `reader`, without the line terminator.
///
/// Output is decoded as UTF-8; invalid sequences are replaced rather than
/// failing the read.
pub fn for_each_line<R, F>(reader: R, mut f: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(String),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        f(String::from_utf8_lossy(&buf).into_owned());
    }
}
