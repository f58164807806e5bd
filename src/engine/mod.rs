// src/engine/mod.rs

//! Consumer side of the event pipeline.
//!
//! - [`queue`]: the mutex-guarded [`EventQueue`] shared with the workers.
//! - [`request`]: the per-invocation [`RequestHandle`] that events are
//!   dispatched to.
//! - [`pump`]: the [`DrainPump`] run on every external tick.
//! - [`shell`]: the [`Shell`] facade exposing `run_command` and
//!   `drain_queue_tick`.

pub mod pump;
pub mod queue;
pub mod request;
pub mod shell;

pub use pump::{DrainPump, DrainReport};
pub use queue::{EventQueue, QueuedEvent};
pub use request::{Completion, RequestHandle};
pub use shell::Shell;
