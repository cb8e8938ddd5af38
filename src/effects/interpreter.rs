//! Effect interpreter trait.
//!
//! The trait-based design enables:
//! - The octocrab-backed interpreter in production (`crate::github`)
//! - An in-memory repository for reconciler tests

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct FixedLabels(LabelSet);
///
/// impl GitHubInterpreter for FixedLabels {
///     type Error = std::io::Error;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         match effect {
///             GitHubEffect::GetLabels { .. } => Ok(GitHubResponse::Labels(self.0.clone())),
///             _ => Ok(GitHubResponse::LabelAdded),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}
