//! The background worker that schedules reconciliation runs.
//!
//! - [`message`]: messages and run triggers
//! - [`poll`]: poll interval and jitter
//! - [`worker`]: the event loop

mod message;
mod poll;
#[allow(clippy::module_inception)]
mod worker;

pub use message::{Trigger, WorkerMessage};
pub use poll::PollConfig;
pub use worker::Worker;
