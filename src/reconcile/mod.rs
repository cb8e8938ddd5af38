//! Per-PR reconciliation.
//!
//! A run fetches every candidate PR fresh, compares what it sees against the
//! policy in [`BotConfig`], and issues the label, merge, title and comment
//! writes needed to close the gap. Each rule checks the label snapshot
//! before writing, so running twice against an unchanged repository writes
//! nothing the second time.
//!
//! # Passes
//!
//! - [`reconcile_open_pr`]: issue tag, ready-to-merge and CI rules for an
//!   open PR.
//! - [`reconcile_merged_pr`]: picks up the application code on merged PRs
//!   still waiting in `ticketing/application-pending`.
//!
//! [`run_once`] drives both passes over the whole repository.

mod gateway;
mod merged;
mod open;
mod outbox;
mod pass;
pub mod templates;

#[cfg(test)]
mod tests;

use std::error::Error as StdError;

use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::effects::{GitHubInterpreter, GitHubResponse};
use crate::types::{Label, PrNumber};

pub use gateway::Gateway;
pub use merged::{application_title, reconcile_merged_pr};
pub use open::reconcile_open_pr;
pub use outbox::Outbox;

/// Errors that abort a PR's pass, or a whole run when listing fails.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A GitHub call failed.
    #[error("{operation} failed: {source}")]
    GitHub {
        operation: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The interpreter answered with a response of the wrong shape.
    #[error("{operation} returned an unexpected response: {response:?}")]
    UnexpectedResponse {
        operation: &'static str,
        response: Box<GitHubResponse>,
    },
}

/// What a single pass did to one PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrOutcome {
    pub pr: PrNumber,
    pub labels_added: Vec<String>,
    pub labels_removed: Vec<String>,
    pub merged: bool,
    pub title_updated: bool,
    /// Whether the pass posted its consolidated comment.
    pub commented: bool,
}

impl PrOutcome {
    pub fn new(pr: PrNumber) -> Self {
        PrOutcome {
            pr,
            labels_added: Vec::new(),
            labels_removed: Vec::new(),
            merged: false,
            title_updated: false,
            commented: false,
        }
    }

    /// Returns true if the pass wrote nothing to GitHub.
    pub fn is_unchanged(&self) -> bool {
        self.labels_added.is_empty()
            && self.labels_removed.is_empty()
            && !self.merged
            && !self.title_updated
            && !self.commented
    }
}

/// A PR whose pass failed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrFailure {
    pub pr: PrNumber,
    pub error: String,
}

/// Summary of one [`run_once`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<PrOutcome>,
    pub failures: Vec<PrFailure>,
}

impl RunReport {
    /// Returns true if every PR pass completed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of PRs the run changed.
    pub fn changed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_unchanged()).count()
    }

    fn record(&mut self, pr: PrNumber, result: Result<PrOutcome, ReconcileError>) {
        match result {
            Ok(outcome) => self.outcomes.push(outcome),
            Err(e) => {
                error!(pr = %pr, error = %e, "Reconciliation failed, continuing with next PR");
                self.failures.push(PrFailure {
                    pr,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Reconciles every open PR, then every merged PR awaiting an application
/// code.
///
/// PRs are processed one at a time. A failure listing candidates aborts the
/// run; a failure inside one PR's pass is logged, recorded in the report, and
/// the run moves on to the next PR.
#[instrument(skip_all, fields(repo = %config.repo))]
pub async fn run_once<G: GitHubInterpreter>(
    gh: &G,
    config: &BotConfig,
) -> Result<RunReport, ReconcileError> {
    let gateway = Gateway::new(gh);
    let mut report = RunReport::default();

    let open = gateway.list_open_prs().await?;
    info!(count = open.len(), "Reconciling open pull requests");
    for pr in &open {
        let result = reconcile_open_pr(gh, config, pr.number).await;
        report.record(pr.number, result);
    }

    let merged = gateway
        .list_merged_prs_with_label(
            config.label(Label::TicketApplicationPending),
            config.merged_query_limit,
            config.merged_comment_limit,
        )
        .await?;
    info!(
        count = merged.len(),
        "Reconciling merged pull requests awaiting an application code"
    );
    for pr in &merged {
        let result = reconcile_merged_pr(gh, config, pr).await;
        report.record(pr.number, result);
    }

    info!(
        changed = report.changed(),
        failed = report.failures.len(),
        "Run complete"
    );
    Ok(report)
}
