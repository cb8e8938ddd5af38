//! Write helpers shared by the open and merged passes.

use tracing::{info, warn};

use crate::config::BotConfig;
use crate::effects::GitHubInterpreter;
use crate::types::{Label, PrNumber};

use super::templates;
use super::{Gateway, Outbox, PrOutcome, ReconcileError};

/// One PR's pass in progress: records every write in the outcome and queues
/// replies to the author.
pub(super) struct PrPass<'a, G> {
    gateway: Gateway<'a, G>,
    config: &'a BotConfig,
    author: &'a str,
    outbox: Outbox,
    outcome: PrOutcome,
}

impl<'a, G: GitHubInterpreter> PrPass<'a, G> {
    pub(super) fn new(
        gateway: Gateway<'a, G>,
        config: &'a BotConfig,
        pr: PrNumber,
        author: &'a str,
    ) -> Self {
        PrPass {
            gateway,
            config,
            author,
            outbox: Outbox::new(pr),
            outcome: PrOutcome::new(pr),
        }
    }

    fn pr(&self) -> PrNumber {
        self.outcome.pr
    }

    pub(super) async fn add_label(&mut self, label: Label) -> Result<(), ReconcileError> {
        let config = self.config;
        let name = config.label(label);
        info!(pr = %self.pr(), label = name, "Adding label");
        self.gateway.add_label(self.pr(), name).await?;
        self.outcome.labels_added.push(name.to_string());
        Ok(())
    }

    pub(super) async fn remove_label(&mut self, label: Label) -> Result<(), ReconcileError> {
        let config = self.config;
        let name = config.label(label);
        info!(pr = %self.pr(), label = name, "Removing label");
        self.gateway.remove_label(self.pr(), name).await?;
        self.outcome.labels_removed.push(name.to_string());
        Ok(())
    }

    pub(super) async fn merge(&mut self) -> Result<(), ReconcileError> {
        let sha = self.gateway.merge_pr(self.pr()).await?;
        info!(pr = %self.pr(), sha = %sha.short(), "Merged");
        self.outcome.merged = true;
        Ok(())
    }

    pub(super) async fn update_title(&mut self, title: String) -> Result<(), ReconcileError> {
        info!(pr = %self.pr(), title = %title, "Updating title");
        self.gateway.update_title(self.pr(), title).await?;
        self.outcome.title_updated = true;
        Ok(())
    }

    /// Queues a reply addressed to the PR author.
    pub(super) fn reply(&mut self, text: &str) {
        self.outbox.say(templates::mention(self.author, text));
    }

    /// Flushes the outbox whatever `result` is and returns the outcome.
    ///
    /// Replies queued before a failed write are still posted. If the rules
    /// failed, their error is returned even when the flush fails too.
    pub(super) async fn finish(
        self,
        result: Result<(), ReconcileError>,
    ) -> Result<PrOutcome, ReconcileError> {
        let PrPass {
            gateway,
            outbox,
            mut outcome,
            ..
        } = self;

        match (result, outbox.post(&gateway).await) {
            (Ok(()), Ok(posted)) => {
                outcome.commented = posted;
                Ok(outcome)
            }
            (Ok(()), Err(flush_error)) => Err(flush_error),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(flush_error)) => {
                warn!(pr = %outcome.pr, error = %flush_error, "Failed to post queued replies");
                Err(e)
            }
        }
    }
}
