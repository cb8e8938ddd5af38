//! Webhook endpoint handler.
//!
//! Verifies each delivery, decides whether it could change a rule's outcome,
//! and if so asks the worker for a run. The handler never talks to GitHub
//! itself and answers 202 Accepted as soon as the request is queued.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use super::AppState;
use crate::types::DeliveryId;
use crate::webhooks::{ParseError, parse_webhook, verify_signature};
use crate::worker::{Trigger, WorkerMessage};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The worker has stopped, so the run can never happen.
    #[error("reconciliation worker is not running")]
    WorkerUnavailable,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) | WebhookError::Parse(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, self.to_string()).into_response()
    }
}

/// `POST /webhook`.
///
/// # Response
///
/// - 202 Accepted: run scheduled, already pending, or delivery ignored
/// - 400 Bad Request: missing header or unparseable payload
/// - 401 Unauthorized: invalid signature
/// - 503 Service Unavailable: the worker has shut down
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(delivery_id = %delivery_id, event_type = %event_type, "Received webhook");

    let Some(secret) = app_state.webhook_secret() else {
        return Err(WebhookError::InvalidSignature);
    };
    if !verify_signature(&body, &signature_header, secret) {
        warn!(delivery_id = %delivery_id, "Invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let parsed = parse_webhook(&event_type, &body)?;

    if let Some(repo) = &parsed.repo
        && !repo.is_same_repo(app_state.repo())
    {
        debug!(delivery_id = %delivery_id, repo = %repo, "Webhook for another repository");
        return Ok((StatusCode::ACCEPTED, "Ignored (other repository)"));
    }

    if !parsed.event.triggers_run() {
        debug!(delivery_id = %delivery_id, event = ?parsed.event, "Webhook does not affect any rule");
        return Ok((StatusCode::ACCEPTED, "Ignored"));
    }

    let message = WorkerMessage::Run(Trigger::Webhook {
        event: event_type,
        delivery: delivery_id.clone(),
    });
    match app_state.worker().try_send(message) {
        Ok(()) => {
            info!(delivery_id = %delivery_id, "Reconciliation run scheduled");
            Ok((StatusCode::ACCEPTED, "Accepted"))
        }
        Err(TrySendError::Full(_)) => {
            debug!(delivery_id = %delivery_id, "Run already pending");
            Ok((StatusCode::ACCEPTED, "Accepted (run already pending)"))
        }
        Err(TrySendError::Closed(_)) => {
            warn!(delivery_id = %delivery_id, "Worker channel closed");
            Err(WebhookError::WorkerUnavailable)
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
