// src/engine/pump.rs

//! Drain step driven by an external periodic tick.
//!
//! Whatever schedules the tick (a timer, an event-loop task, a poller thread)
//! is a collaborator; the pump only requires that every tick comes from the
//! same thread. The first thread to tick becomes the owner.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use tracing::{error, trace, warn};

use crate::engine::queue::{EventQueue, QueuedEvent};
use crate::engine::request::panic_message;
use crate::errors::{Result, ShellError};
use crate::types::{LogKind, ShellEvent};

/// Counters for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Events dispatched without error.
    pub delivered: usize,
    /// Events whose dispatch failed (reported and skipped).
    pub failed: usize,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.delivered + self.failed
    }
}

#[derive(Debug)]
pub struct DrainPump {
    queue: Arc<EventQueue>,
    owner: OnceLock<ThreadId>,
}

impl DrainPump {
    pub fn new(queue: Arc<EventQueue>) -> Self {
        Self {
            queue,
            owner: OnceLock::new(),
        }
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Drain the queue and dispatch every event to its request, in order.
    ///
    /// A failing dispatch is logged and does not stop the rest of the batch.
    /// Ticks from any thread other than the owner are refused.
    pub fn tick(&self) -> DrainReport {
        let current = thread::current().id();
        let owner = *self.owner.get_or_init(|| current);
        if owner != current {
            error!(
                ?owner,
                ?current,
                "drain tick from a thread other than the consumer thread; ignoring"
            );
            return DrainReport::default();
        }

        let batch = self.queue.drain_all();
        if batch.is_empty() {
            return DrainReport::default();
        }
        trace!(events = batch.len(), "draining event queue");

        let mut report = DrainReport::default();
        for queued in batch {
            let request = queued.request.id();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| dispatch(queued)))
                .unwrap_or_else(|payload| {
                    Err(ShellError::Dispatch {
                        request,
                        message: panic_message(payload.as_ref()),
                    })
                });

            match outcome {
                Ok(()) => report.delivered += 1,
                Err(err @ ShellError::NonZeroExit { .. }) => {
                    // The completion was recorded; this is the policy report.
                    warn!(request = %request, error = %err, "command failed");
                    report.delivered += 1;
                }
                Err(err) => {
                    error!(request = %request, error = %err, "event dispatch failed");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

fn dispatch(queued: QueuedEvent) -> Result<()> {
    let QueuedEvent { request, event } = queued;
    match event {
        ShellEvent::InfoLog(line) => request.log_line(LogKind::Info, &line),
        ShellEvent::ErrorLog(line) => request.log_line(LogKind::Error, &line),
        ShellEvent::EndStream(code) => request.notify_complete(code),
    }
}
