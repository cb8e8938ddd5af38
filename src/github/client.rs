//! Octocrab client wrapper scoped to a specific repository.
//!
//! This module provides `OctocrabClient`, which wraps an `Octocrab` instance
//! and scopes all operations to a specific repository. This matches the design
//! where effects are repo-scoped (the `GitHubEffect` enum doesn't include repo info).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RepoId;

/// How the bot merges a PR labelled ready-to-merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// A merge commit (GitHub's default).
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    /// Returns the `merge_method` value expected by the merge endpoint.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
            MergeMethod::Rebase => "rebase",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown merge method '{0}': expected merge, squash or rebase")]
pub struct UnknownMergeMethod(pub String);

impl FromStr for MergeMethod {
    type Err = UnknownMergeMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(MergeMethod::Merge),
            "squash" => Ok(MergeMethod::Squash),
            "rebase" => Ok(MergeMethod::Rebase),
            _ => Err(UnknownMergeMethod(s.to_string())),
        }
    }
}

/// A GitHub API client scoped to a specific repository.
///
/// All operations performed through this client target the same repository,
/// matching the design where `GitHubEffect` variants don't include repo info.
#[derive(Clone)]
pub struct OctocrabClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// The repository this client is scoped to.
    repo: RepoId,

    merge_method: MergeMethod,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    ///
    /// Merges use a merge commit until configured otherwise.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self {
            client,
            repo,
            merge_method: MergeMethod::default(),
        }
    }

    /// Creates a client from a GitHub token.
    ///
    /// Every request observes `timeout` for connecting and for reading the
    /// response.
    pub fn from_token(
        token: impl Into<String>,
        repo: RepoId,
        timeout: Duration,
    ) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .set_connect_timeout(Some(timeout))
            .set_read_timeout(Some(timeout))
            .build()?;
        Ok(Self::new(client, repo))
    }

    pub fn with_merge_method(mut self, merge_method: MergeMethod) -> Self {
        self.merge_method = merge_method;
        self
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Returns the repository this client is scoped to.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    /// Returns the repository name.
    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    pub fn merge_method(&self) -> MergeMethod {
        self.merge_method
    }
}

impl fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .field("merge_method", &self.merge_method)
            .finish_non_exhaustive()
    }
}
