//! HTTP server for the review bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries (returns 202 Accepted).
//!   Mounted only when a webhook secret is configured.
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::types::RepoId;
use crate::worker::WorkerMessage;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

/// Shared application state, passed to handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The only repository whose deliveries schedule runs.
    repo: RepoId,

    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Option<Vec<u8>>,

    worker: mpsc::Sender<WorkerMessage>,
}

impl AppState {
    pub fn new(
        repo: RepoId,
        webhook_secret: Option<Vec<u8>>,
        worker: mpsc::Sender<WorkerMessage>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                repo,
                webhook_secret,
                worker,
            }),
        }
    }

    pub fn repo(&self) -> &RepoId {
        &self.inner.repo
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }

    /// Sender for the reconciliation worker.
    pub fn worker(&self) -> &mpsc::Sender<WorkerMessage> {
        &self.inner.worker
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    let router = axum::Router::new().route("/health", get(health_handler));
    let router = if app_state.webhook_secret().is_some() {
        router.route("/webhook", post(webhook_handler))
    } else {
        router
    };
    router.with_state(app_state)
}
