//! Messages accepted by the reconciliation worker.

use std::fmt;

use crate::types::DeliveryId;

/// Why a run was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The worker just started.
    Startup,
    /// The poll timer fired.
    Poll,
    /// A verified webhook delivery for an event the rules care about.
    Webhook { event: String, delivery: DeliveryId },
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => f.write_str("startup"),
            Trigger::Poll => f.write_str("poll"),
            Trigger::Webhook { event, delivery } => write!(f, "webhook {event} ({delivery})"),
        }
    }
}

/// Messages that can be sent to the worker.
///
/// Runs requested while another run is queued are coalesced into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Reconcile the repository.
    Run(Trigger),

    /// Finish the current run, then exit the loop.
    Shutdown,
}
