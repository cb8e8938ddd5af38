//! The webhook events that can change what the rules decide.
//!
//! Only a handful of fields are read from each payload. Deliveries the bot
//! has no use for still parse, as [`WebhookEvent::Other`].

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CiState, PrNumber, RepoId};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload has no repository")]
    MissingRepository,
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Sent once when the webhook is created.
    Ping,

    /// Opened, edited, labelled, merged and so on.
    PullRequest { action: String, number: PrNumber },

    /// A conversation comment. `on_pull_request` is false for plain issues.
    IssueComment {
        action: String,
        number: PrNumber,
        on_pull_request: bool,
    },

    /// A commit status report.
    Status { context: String, state: CiState },

    /// Any other event type.
    Other(String),
}

impl WebhookEvent {
    /// Returns true if the delivery may change a rule's outcome, so a run
    /// should be scheduled.
    ///
    /// Statuses from every context count; `pending` never changes labels.
    pub fn triggers_run(&self) -> bool {
        match self {
            WebhookEvent::PullRequest { action, .. } => matches!(
                action.as_str(),
                "opened"
                    | "reopened"
                    | "edited"
                    | "synchronize"
                    | "labeled"
                    | "unlabeled"
                    | "closed"
            ),
            WebhookEvent::IssueComment {
                action,
                on_pull_request,
                ..
            } => *on_pull_request && matches!(action.as_str(), "created" | "edited"),
            WebhookEvent::Status { state, .. } => *state != CiState::Pending,
            WebhookEvent::Ping | WebhookEvent::Other(_) => false,
        }
    }
}

/// An event together with the repository it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWebhook {
    /// `None` only for pings on organisation hooks.
    pub repo: Option<RepoId>,
    pub event: WebhookEvent,
}

#[derive(Deserialize)]
struct Owner {
    login: String,
}

#[derive(Deserialize)]
struct Repository {
    name: String,
    owner: Owner,
}

#[derive(Deserialize)]
struct Envelope {
    repository: Option<Repository>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    action: String,
    number: u64,
}

#[derive(Deserialize)]
struct IssueRef {
    number: u64,
    /// Present only when the issue is a pull request.
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct IssueCommentPayload {
    action: String,
    issue: IssueRef,
}

#[derive(Deserialize)]
struct StatusPayload {
    context: String,
    state: String,
}

/// Parses a delivery by its `X-GitHub-Event` type.
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<ParsedWebhook, ParseError> {
    let envelope: Envelope = serde_json::from_slice(payload)?;
    let repo = envelope
        .repository
        .map(|r| RepoId::new(r.owner.login, r.name));

    let event = match event_type {
        "ping" => WebhookEvent::Ping,
        "pull_request" => {
            let p: PullRequestPayload = serde_json::from_slice(payload)?;
            WebhookEvent::PullRequest {
                action: p.action,
                number: PrNumber(p.number),
            }
        }
        "issue_comment" => {
            let p: IssueCommentPayload = serde_json::from_slice(payload)?;
            WebhookEvent::IssueComment {
                action: p.action,
                number: PrNumber(p.issue.number),
                on_pull_request: p.issue.pull_request.is_some(),
            }
        }
        "status" => {
            let p: StatusPayload = serde_json::from_slice(payload)?;
            WebhookEvent::Status {
                context: p.context,
                state: CiState::from_api_str(&p.state),
            }
        }
        other => WebhookEvent::Other(other.to_string()),
    };

    if repo.is_none() && event != WebhookEvent::Ping {
        return Err(ParseError::MissingRepository);
    }
    Ok(ParsedWebhook { repo, event })
}
