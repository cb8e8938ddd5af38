//! Buffered replies for one PR.

use tracing::debug;

use crate::effects::GitHubInterpreter;
use crate::types::PrNumber;

use super::{Gateway, ReconcileError};

/// Collects reply lines during a pass and posts them as a single comment.
///
/// [`Outbox::post`] consumes the outbox, so a pass can comment at most once
/// however many rules replied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbox {
    pr: PrNumber,
    lines: Vec<String>,
}

impl Outbox {
    pub fn new(pr: PrNumber) -> Self {
        Outbox {
            pr,
            lines: Vec::new(),
        }
    }

    /// Queues `text` for the end-of-pass comment.
    pub fn say(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The comment body that [`Outbox::post`] would send.
    pub fn body(&self) -> Option<String> {
        (!self.lines.is_empty()).then(|| self.lines.join("\n"))
    }

    /// Posts the queued lines, newline-joined, as one comment.
    ///
    /// Returns whether a comment was posted. An empty outbox is a no-op.
    pub async fn post<G: GitHubInterpreter>(
        self,
        gateway: &Gateway<'_, G>,
    ) -> Result<bool, ReconcileError> {
        let Some(body) = self.body() else {
            return Ok(false);
        };
        debug!(pr = %self.pr, replies = self.lines.len(), "Posting comment");
        gateway.create_comment(self.pr, body).await?;
        Ok(true)
    }
}
