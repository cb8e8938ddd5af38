//! The reconciliation event loop.
//!
//! One worker serves one repository. It reconciles once at startup, then
//! whenever a message asks it to or the poll timer fires. Runs never overlap:
//! requests that arrive during a run wait in the channel and are coalesced
//! into a single follow-up run.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::BotConfig;
use crate::effects::GitHubInterpreter;
use crate::reconcile::run_once;

use super::message::{Trigger, WorkerMessage};
use super::poll::PollConfig;

pub struct Worker<G> {
    gh: Arc<G>,
    config: BotConfig,
    poll: PollConfig,
}

/// Queued messages drained after a trigger.
struct Drained {
    coalesced: usize,
    shutdown: bool,
}

impl<G: GitHubInterpreter> Worker<G> {
    pub fn new(gh: Arc<G>, config: BotConfig, poll: PollConfig) -> Self {
        Worker { gh, config, poll }
    }

    /// Runs the worker event loop until shutdown.
    ///
    /// Stops when `shutdown` is cancelled, a [`WorkerMessage::Shutdown`]
    /// arrives, or every sender is dropped. A run in progress always
    /// completes first. Returns the number of runs performed.
    #[instrument(skip(self, rx, shutdown), fields(repo = %self.config.repo))]
    pub async fn run(
        self,
        mut rx: mpsc::Receiver<WorkerMessage>,
        shutdown: CancellationToken,
    ) -> u64 {
        info!("Worker event loop started");
        let interval = self.poll.poll_interval_with_jitter(&self.config.repo);
        debug!(interval_secs = interval.as_secs(), "Poll interval");

        let mut runs = 0;
        let mut next = Some(Trigger::Startup);

        loop {
            if let Some(trigger) = next.take() {
                let drained = drain(&mut rx);
                if drained.coalesced > 0 {
                    debug!(coalesced = drained.coalesced, "Coalesced queued run requests");
                }
                self.reconcile(&trigger).await;
                runs += 1;
                if drained.shutdown {
                    info!("Shutdown message received");
                    break;
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping worker");
                    break;
                }

                msg = rx.recv() => {
                    match msg {
                        Some(WorkerMessage::Run(trigger)) => next = Some(trigger),
                        Some(WorkerMessage::Shutdown) => {
                            info!("Shutdown message received");
                            break;
                        }
                        None => {
                            info!("Message channel closed");
                            break;
                        }
                    }
                }

                _ = tokio::time::sleep(interval) => next = Some(Trigger::Poll),
            }
        }

        info!(runs, "Worker event loop stopped");
        runs
    }

    async fn reconcile(&self, trigger: &Trigger) {
        info!(trigger = %trigger, "Starting reconciliation run");
        match run_once(self.gh.as_ref(), &self.config).await {
            Ok(report) if report.is_success() => {
                info!(changed = report.changed(), "Run succeeded");
            }
            Ok(report) => {
                warn!(
                    changed = report.changed(),
                    failed = report.failures.len(),
                    "Run finished with failures"
                );
            }
            Err(e) => error!(error = %e, "Run aborted"),
        }
    }
}

/// Takes every message already queued. Run requests fold into the run about
/// to start.
fn drain(rx: &mut mpsc::Receiver<WorkerMessage>) -> Drained {
    let mut drained = Drained {
        coalesced: 0,
        shutdown: false,
    };
    while let Ok(msg) = rx.try_recv() {
        match msg {
            WorkerMessage::Run(trigger) => {
                debug!(trigger = %trigger, "Coalescing run request");
                drained.coalesced += 1;
            }
            WorkerMessage::Shutdown => drained.shutdown = true,
        }
    }
    drained
}
