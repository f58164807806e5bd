// src/engine/request.rs

//! Caller-facing handle for one command invocation.
//!
//! A [`RequestHandle`] is created by the launcher, cloned into the queue by
//! the stream reader worker, and mutated only by the drain pump through
//! [`RequestHandle::log_line`] and [`RequestHandle::notify_complete`].
//! Callers observe it through callbacks, status queries or [`RequestHandle::wait`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::{Result, ShellError};
use crate::types::{LogKind, RequestId};

type LineCallback = Box<dyn FnMut(LogKind, &str) + Send>;
type CompletionCallback = Box<dyn FnOnce(&Completion) + Send>;

/// Final result of a request, recorded once its `EndStream` is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub command: String,
    pub exit_code: i32,
    /// Whether a non-zero exit code counts as a failure for this request.
    pub throw_on_non_zero: bool,
}

impl Completion {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// `Ok(exit_code)`, or `Err(NonZeroExit)` when the code is non-zero and
    /// the request was launched with the throw-on-non-zero policy.
    pub fn result(&self) -> Result<i32> {
        if self.throw_on_non_zero && self.exit_code != 0 {
            Err(ShellError::NonZeroExit {
                command: self.command.clone(),
                code: self.exit_code,
            })
        } else {
            Ok(self.exit_code)
        }
    }
}

#[derive(Default)]
struct Sinks {
    lines: Vec<LineCallback>,
    completions: Vec<CompletionCallback>,
}

struct RequestInner {
    id: RequestId,
    command: String,
    quiet: bool,
    throw_on_non_zero: bool,
    /// `None` while running, `Some` once completed. Never goes back.
    done: watch::Sender<Option<Completion>>,
    sinks: Mutex<Sinks>,
}

/// Shared handle correlating one command invocation with its log callbacks
/// and final exit code.
///
/// State machine: `Running -> Completed`, no transition back. Once completed,
/// further log lines or completions are rejected with
/// [`ShellError::RequestCompleted`].
#[derive(Clone)]
pub struct RequestHandle {
    inner: Arc<RequestInner>,
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.inner.id)
            .field("command", &self.inner.command)
            .field("completion", &self.completion())
            .finish_non_exhaustive()
    }
}

impl RequestHandle {
    pub fn new(
        id: RequestId,
        command: impl Into<String>,
        quiet: bool,
        throw_on_non_zero: bool,
    ) -> Self {
        let (done, _) = watch::channel(None);
        Self {
            inner: Arc::new(RequestInner {
                id,
                command: command.into(),
                quiet,
                throw_on_non_zero,
                done,
                sinks: Mutex::new(Sinks::default()),
            }),
        }
    }

    pub fn id(&self) -> RequestId {
        self.inner.id
    }

    pub fn command(&self) -> &str {
        &self.inner.command
    }

    pub fn is_quiet(&self) -> bool {
        self.inner.quiet
    }

    pub fn is_completed(&self) -> bool {
        self.inner.done.borrow().is_some()
    }

    /// Exit code, available only after completion.
    pub fn exit_code(&self) -> Option<i32> {
        self.inner.done.borrow().as_ref().map(|c| c.exit_code)
    }

    pub fn completion(&self) -> Option<Completion> {
        self.inner.done.borrow().clone()
    }

    /// Register a callback for stdout lines.
    pub fn on_info<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_log(move |kind, line| {
            if kind == LogKind::Info {
                f(line)
            }
        })
    }

    /// Register a callback for stderr lines.
    pub fn on_error<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.on_log(move |kind, line| {
            if kind == LogKind::Error {
                f(line)
            }
        })
    }

    /// Register a callback receiving every log line with its channel.
    pub fn on_log<F>(&self, f: F) -> &Self
    where
        F: FnMut(LogKind, &str) + Send + 'static,
    {
        self.sinks().lines.push(Box::new(f));
        self
    }

    /// Register a completion callback.
    ///
    /// If the request has already completed, `f` runs immediately on the
    /// calling thread.
    pub fn on_complete<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Completion) + Send + 'static,
    {
        let mut sinks = self.sinks();
        match self.completion() {
            Some(completion) => {
                drop(sinks);
                f(&completion);
            }
            None => sinks.completions.push(Box::new(f)),
        }
        self
    }

    /// Wait for completion and return the exit code.
    ///
    /// Resolves to `Err(NonZeroExit)` when the request was launched with the
    /// throw-on-non-zero policy and exited with a non-zero code. The drain
    /// pump must keep ticking on its own thread for this to resolve.
    pub async fn wait(&self) -> Result<i32> {
        let mut rx = self.inner.done.subscribe();
        let changed = rx.wait_for(Option::is_some).await;
        let completion = changed
            .map_err(|_| anyhow!("completion channel closed for request {}", self.inner.id))?
            .clone();

        match completion {
            Some(completion) => completion.result(),
            None => Err(anyhow!("request {} has no completion", self.inner.id).into()),
        }
    }

    /// Forward one line to the registered sinks. Called by the drain pump.
    ///
    /// Every callback runs even if an earlier one panics; the first panic is
    /// returned as [`ShellError::Dispatch`].
    pub fn log_line(&self, kind: LogKind, line: &str) -> Result<()> {
        if self.is_completed() {
            return Err(ShellError::RequestCompleted {
                request: self.inner.id,
            });
        }

        if !self.inner.quiet {
            match kind {
                LogKind::Info => info!(request = %self.inner.id, "{line}"),
                LogKind::Error => warn!(request = %self.inner.id, "{line}"),
            }
        }

        // Callbacks run without the lock held so they may register more sinks.
        let mut callbacks = std::mem::take(&mut self.sinks().lines);
        let mut failure = None;
        for callback in callbacks.iter_mut() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(kind, line))) {
                failure.get_or_insert_with(|| panic_message(payload.as_ref()));
            }
        }

        let mut sinks = self.sinks();
        callbacks.append(&mut sinks.lines);
        sinks.lines = callbacks;
        drop(sinks);

        match failure {
            Some(message) => Err(ShellError::Dispatch {
                request: self.inner.id,
                message,
            }),
            None => Ok(()),
        }
    }

    /// Record the exit code, mark the request terminal and wake waiters.
    /// Called by the drain pump, exactly once per request.
    ///
    /// The completion is recorded even when this returns an error. Returns
    /// [`ShellError::Dispatch`] if a completion callback panicked, otherwise
    /// `Err(NonZeroExit)` under the throw-on-non-zero policy.
    pub fn notify_complete(&self, exit_code: i32) -> Result<()> {
        let completion = Completion {
            command: self.inner.command.clone(),
            exit_code,
            throw_on_non_zero: self.inner.throw_on_non_zero,
        };

        let newly_completed = self.inner.done.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(completion.clone());
            true
        });
        if !newly_completed {
            return Err(ShellError::RequestCompleted {
                request: self.inner.id,
            });
        }

        debug!(
            request = %self.inner.id,
            cmd = %self.inner.command,
            exit_code,
            "request completed"
        );

        let callbacks = {
            let mut sinks = self.sinks();
            sinks.lines.clear();
            std::mem::take(&mut sinks.completions)
        };

        let mut failure = None;
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&completion))) {
                failure.get_or_insert_with(|| panic_message(payload.as_ref()));
            }
        }

        if let Some(message) = failure {
            return Err(ShellError::Dispatch {
                request: self.inner.id,
                message,
            });
        }
        completion.result().map(|_| ())
    }

    fn sinks(&self) -> MutexGuard<'_, Sinks> {
        self.inner.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "callback panicked".to_string()
    }
}
