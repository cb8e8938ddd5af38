//! Commit status check types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of a commit status, as reported by GitHub's statuses API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiState {
    Success,
    Failure,
    Error,
    Pending,
}

impl CiState {
    /// Parses the API state string.
    ///
    /// Anything unrecognised is treated as `Pending` so the CI rule leaves the
    /// labels alone until a definite result arrives.
    pub fn from_api_str(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "success" => CiState::Success,
            "failure" => CiState::Failure,
            "error" => CiState::Error,
            "pending" => CiState::Pending,
            other => {
                tracing::warn!(state = other, "Unknown commit status state, treating as pending");
                CiState::Pending
            }
        }
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            CiState::Success => "success",
            CiState::Failure => "failure",
            CiState::Error => "error",
            CiState::Pending => "pending",
        }
    }

    /// Returns true for `Failure` and `Error`, the two states that mark a build red.
    pub fn is_failed(&self) -> bool {
        matches!(self, CiState::Failure | CiState::Error)
    }
}

impl fmt::Display for CiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// A single status report against a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCheck {
    /// The reporting context, e.g. `ci/circleci`.
    pub context: String,
    pub state: CiState,
    /// Link to the build log, if the provider supplied one.
    pub target_url: Option<String>,
}

impl StatusCheck {
    /// The placeholder used when the CI provider has not reported yet.
    pub fn pending(context: impl Into<String>) -> Self {
        StatusCheck {
            context: context.into(),
            state: CiState::Pending,
            target_url: None,
        }
    }
}
