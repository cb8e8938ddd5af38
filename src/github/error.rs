//! GitHub API error types.
//!
//! Calls are never retried within a run. Each failure is still classified so
//! the log says whether the next scheduled run is likely to get through:
//!
//! - **Transient**: 5xx, rate limits, network failures
//! - **Permanent**: most 4xx, merge conflicts, malformed responses

use std::fmt;
use thiserror::Error;

/// Whether a failure is expected to clear up on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Likely to succeed on a later run.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with rate limit headers
    /// - Network timeouts
    Transient,

    /// Needs someone to change the PR, the token or the configuration.
    ///
    /// Examples:
    /// - HTTP 4xx (except rate limits)
    /// - "Pull Request is not mergeable" (405 on merge)
    /// - Label not found on removal (404)
    /// - Authentication failures (401, 403 non-rate-limit)
    Permanent,
}

/// A categorized GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error (transient or permanent).
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GitHub API error")?;
        match (self.status_code, self.kind) {
            (Some(code), GitHubErrorKind::Transient) => write!(f, " (HTTP {code}, transient)")?,
            (Some(code), GitHubErrorKind::Permanent) => write!(f, " (HTTP {code})")?,
            (None, GitHubErrorKind::Transient) => write!(f, " (transient)")?,
            (None, GitHubErrorKind::Permanent) => {}
        }
        write!(f, ": {}", self.message)
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    ///
    /// Categorization is based on the HTTP status code when one can be
    /// recovered, and on known message patterns otherwise.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = err.to_string();
        let kind = categorize(status_code, &message);

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Decides transient vs permanent from a status code and message.
fn categorize(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    if is_transient_message(message) {
        return GitHubErrorKind::Transient;
    }

    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// `GitHub` errors carry the status code directly. Other variants only
/// expose it through their message, so fall back to string matching there.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }
    status_code_from_message(&err.to_string())
}

fn status_code_from_message(err_str: &str) -> Option<u16> {
    if let Some(idx) = err_str.find("status: ") {
        let digits: String = err_str[idx + 8..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    const KNOWN: [u16; 9] = [404, 405, 409, 422, 403, 401, 429, 500, 502];
    KNOWN
        .into_iter()
        .find(|code| err_str.contains(&code.to_string()))
}

/// Checks if an error message indicates a transient condition.
fn is_transient_message(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("try again") || message_lower.contains("base branch was modified")
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
