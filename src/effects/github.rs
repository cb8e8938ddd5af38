//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! An interpreter (see [`super::GitHubInterpreter`]) executes these effects
//! against the actual GitHub API, or against an in-memory repository in tests.

use serde::{Deserialize, Serialize};

use crate::types::{LabelSet, PrNumber, Sha, StatusCheck};

/// A GitHub API effect.
///
/// Each variant describes a GitHub API operation. Effects are repo-scoped:
/// the interpreter is constructed with a `RepoId`, so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── PR Queries ───────────────────────────────────────────────────────────
    /// List all open PRs in the repository.
    ListOpenPrs,

    /// List merged PRs carrying `label`, with their most recent comments
    /// (via GraphQL).
    ///
    /// Only the `limit` most recent PRs and the `comment_limit` most recent
    /// comments per PR are returned.
    ListMergedPrsWithLabel {
        label: String,
        limit: u32,
        comment_limit: u32,
    },

    /// Fetch a single PR by number.
    GetPr { pr: PrNumber },

    /// Fetch the labels currently attached to a PR.
    GetLabels { pr: PrNumber },

    /// Fetch the commit statuses reported against a SHA, newest first.
    GetStatuses { sha: Sha },

    // ─── Label Mutations ──────────────────────────────────────────────────────
    /// Attach a label to a PR.
    AddLabel { pr: PrNumber, label: String },

    /// Detach a label from a PR.
    RemoveLabel { pr: PrNumber, label: String },

    // ─── PR Mutations ─────────────────────────────────────────────────────────
    /// Post a new comment on a PR.
    PostComment { pr: PrNumber, body: String },

    /// Replace the PR title.
    UpdateTitle { pr: PrNumber, title: String },

    /// Merge a PR using the interpreter's configured merge method.
    MergePr { pr: PrNumber },
}

impl GitHubEffect {
    /// Returns true if this effect changes state on GitHub.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            GitHubEffect::AddLabel { .. }
                | GitHubEffect::RemoveLabel { .. }
                | GitHubEffect::PostComment { .. }
                | GitHubEffect::UpdateTitle { .. }
                | GitHubEffect::MergePr { .. }
        )
    }

    /// Short operation name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::ListOpenPrs => "list_open_prs",
            GitHubEffect::ListMergedPrsWithLabel { .. } => "list_merged_prs_with_label",
            GitHubEffect::GetPr { .. } => "get_pr",
            GitHubEffect::GetLabels { .. } => "get_labels",
            GitHubEffect::GetStatuses { .. } => "get_statuses",
            GitHubEffect::AddLabel { .. } => "add_label",
            GitHubEffect::RemoveLabel { .. } => "remove_label",
            GitHubEffect::PostComment { .. } => "post_comment",
            GitHubEffect::UpdateTitle { .. } => "update_title",
            GitHubEffect::MergePr { .. } => "merge_pr",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// PR data returned from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrData {
    /// The PR number.
    pub number: PrNumber,
    pub title: String,
    /// The PR description. GitHub returns `null` for an empty description.
    pub body: Option<String>,
    /// The current head SHA.
    pub head_sha: Sha,
    /// Login of the PR author.
    pub author: String,
    /// Whether the PR has been merged.
    pub merged: bool,
}

/// A comment as seen by the merged-PR query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentData {
    /// Login of the comment author. Empty for deleted ("ghost") accounts.
    pub author: String,
    pub body: String,
}

/// A merged PR together with its most recent comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedPrData {
    pub number: PrNumber,
    pub title: String,
    pub body: Option<String>,
    pub author: String,
    /// Labels attached to the PR when it was queried.
    pub labels: LabelSet,
    /// Most recent comments, oldest first.
    pub comments: Vec<CommentData>,
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `ListOpenPrs`.
    PrList(Vec<PrData>),

    /// Response to `ListMergedPrsWithLabel`.
    MergedPrList(Vec<MergedPrData>),

    /// Response to `GetPr`.
    Pr(PrData),

    /// Response to `GetLabels`.
    Labels(LabelSet),

    /// Response to `GetStatuses`.
    Statuses(Vec<StatusCheck>),

    /// Response to `AddLabel`.
    LabelAdded,

    /// Response to `RemoveLabel`.
    LabelRemoved,

    /// Response to `PostComment`.
    CommentPosted,

    /// Response to `UpdateTitle`.
    TitleUpdated,

    /// Response to `MergePr`.
    Merged {
        /// The SHA of the merge commit on the base branch.
        sha: Sha,
    },
}
