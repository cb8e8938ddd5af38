//! Typed wrappers over the GitHub effects used by the reconcilers.

use tracing::debug;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, MergedPrData, PrData};
use crate::types::{LabelSet, PrNumber, Sha, StatusCheck};

use super::ReconcileError;

/// Label, comment, title and merge operations on one repository.
///
/// Each method issues exactly one effect and checks that the interpreter
/// answered with the matching response variant.
pub struct Gateway<'a, G> {
    gh: &'a G,
}

impl<G> Clone for Gateway<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Gateway<'_, G> {}

fn unexpected(operation: &'static str, response: GitHubResponse) -> ReconcileError {
    ReconcileError::UnexpectedResponse {
        operation,
        response: Box::new(response),
    }
}

impl<'a, G: GitHubInterpreter> Gateway<'a, G> {
    pub fn new(gh: &'a G) -> Self {
        Gateway { gh }
    }

    async fn call(&self, effect: GitHubEffect) -> Result<GitHubResponse, ReconcileError> {
        let operation = effect.name();
        debug!(operation, "Calling GitHub");
        self.gh
            .interpret(effect)
            .await
            .map_err(|e| ReconcileError::GitHub {
                operation,
                source: Box::new(e),
            })
    }

    pub async fn list_open_prs(&self) -> Result<Vec<PrData>, ReconcileError> {
        match self.call(GitHubEffect::ListOpenPrs).await? {
            GitHubResponse::PrList(prs) => Ok(prs),
            other => Err(unexpected("list_open_prs", other)),
        }
    }

    pub async fn list_merged_prs_with_label(
        &self,
        label: &str,
        limit: u32,
        comment_limit: u32,
    ) -> Result<Vec<MergedPrData>, ReconcileError> {
        let effect = GitHubEffect::ListMergedPrsWithLabel {
            label: label.to_string(),
            limit,
            comment_limit,
        };
        match self.call(effect).await? {
            GitHubResponse::MergedPrList(prs) => Ok(prs),
            other => Err(unexpected("list_merged_prs_with_label", other)),
        }
    }

    pub async fn get_pr(&self, pr: PrNumber) -> Result<PrData, ReconcileError> {
        match self.call(GitHubEffect::GetPr { pr }).await? {
            GitHubResponse::Pr(data) => Ok(data),
            other => Err(unexpected("get_pr", other)),
        }
    }

    pub async fn get_labels(&self, pr: PrNumber) -> Result<LabelSet, ReconcileError> {
        match self.call(GitHubEffect::GetLabels { pr }).await? {
            GitHubResponse::Labels(labels) => Ok(labels),
            other => Err(unexpected("get_labels", other)),
        }
    }

    pub async fn get_statuses(&self, sha: &Sha) -> Result<Vec<StatusCheck>, ReconcileError> {
        let effect = GitHubEffect::GetStatuses { sha: sha.clone() };
        match self.call(effect).await? {
            GitHubResponse::Statuses(statuses) => Ok(statuses),
            other => Err(unexpected("get_statuses", other)),
        }
    }

    pub async fn add_label(&self, pr: PrNumber, label: &str) -> Result<(), ReconcileError> {
        let effect = GitHubEffect::AddLabel {
            pr,
            label: label.to_string(),
        };
        match self.call(effect).await? {
            GitHubResponse::LabelAdded => Ok(()),
            other => Err(unexpected("add_label", other)),
        }
    }

    pub async fn remove_label(&self, pr: PrNumber, label: &str) -> Result<(), ReconcileError> {
        let effect = GitHubEffect::RemoveLabel {
            pr,
            label: label.to_string(),
        };
        match self.call(effect).await? {
            GitHubResponse::LabelRemoved => Ok(()),
            other => Err(unexpected("remove_label", other)),
        }
    }

    pub async fn create_comment(&self, pr: PrNumber, body: String) -> Result<(), ReconcileError> {
        match self.call(GitHubEffect::PostComment { pr, body }).await? {
            GitHubResponse::CommentPosted => Ok(()),
            other => Err(unexpected("post_comment", other)),
        }
    }

    pub async fn update_title(&self, pr: PrNumber, title: String) -> Result<(), ReconcileError> {
        match self.call(GitHubEffect::UpdateTitle { pr, title }).await? {
            GitHubResponse::TitleUpdated => Ok(()),
            other => Err(unexpected("update_title", other)),
        }
    }

    /// Merges the PR and returns the merge commit SHA.
    pub async fn merge_pr(&self, pr: PrNumber) -> Result<Sha, ReconcileError> {
        match self.call(GitHubEffect::MergePr { pr }).await? {
            GitHubResponse::Merged { sha } => Ok(sha),
            other => Err(unexpected("merge_pr", other)),
        }
    }
}
