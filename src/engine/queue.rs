// src/engine/queue.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::engine::request::RequestHandle;
use crate::types::ShellEvent;

/// One pending event together with the request it belongs to.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    pub request: RequestHandle,
    pub event: ShellEvent,
}

/// Append-only buffer of pending events shared between the stream reader
/// workers (producers) and the drain pump (single consumer).
///
/// Semantics:
/// - `enqueue` may be called from any thread; each producer's events keep
///   the order in which that producer pushed them.
/// - `drain_all` swaps the whole buffer out under the lock, so every event
///   is returned by exactly one drain and nothing pushed concurrently is lost.
/// - The lock is only held for a push or a swap, never across I/O.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Mutex<Vec<QueuedEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event for `request` to the tail of the queue.
    pub fn enqueue(&self, request: &RequestHandle, event: ShellEvent) {
        trace!(request = %request.id(), ?event, "enqueue");
        self.lock().push(QueuedEvent {
            request: request.clone(),
            event,
        });
    }

    /// Atomically remove and return every queued event in FIFO order.
    ///
    /// Leaves the queue empty; returns an empty vector when nothing is queued.
    pub fn drain_all(&self) -> Vec<QueuedEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A producer that panicked mid-push cannot leave the Vec half-written,
    // so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<QueuedEvent>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
