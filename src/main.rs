use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use review_bot::config::Settings;
use review_bot::github::OctocrabClient;
use review_bot::reconcile::run_once;
use review_bot::server::{AppState, build_router};
use review_bot::worker::{Worker, WorkerMessage};

/// Run requests beyond this many are coalesced by the worker anyway.
const WORKER_QUEUE: usize = 16;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "review_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let client = OctocrabClient::from_token(
        settings.github_token.clone(),
        settings.bot.repo.clone(),
        settings.request_timeout,
    )
    .context("failed to build GitHub client")?
    .with_merge_method(settings.merge_method);

    if settings.oneshot {
        let report = run_once(&client, &settings.bot).await?;
        for failure in &report.failures {
            tracing::error!(pr = %failure.pr, error = %failure.error, "PR failed");
        }
        return Ok(if report.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    serve(settings, client).await?;
    Ok(ExitCode::SUCCESS)
}

async fn serve(settings: Settings, client: OctocrabClient) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel::<WorkerMessage>(WORKER_QUEUE);

    let worker = Worker::new(Arc::new(client), settings.bot.clone(), settings.poll.clone());
    let worker_handle = tokio::spawn(worker.run(rx, shutdown.clone()));

    if settings.webhook_secret.is_none() {
        tracing::warn!("GITHUB_WEBHOOK_SECRET not set, /webhook is disabled; relying on polling");
    }
    let app = build_router(AppState::new(
        settings.bot.repo.clone(),
        settings.webhook_secret.clone(),
        tx,
    ));

    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;
    tracing::info!(addr = %settings.listen_addr, repo = %settings.bot.repo, "listening");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl-C received, shutting down"),
                _ = server_shutdown.cancelled() => {}
            }
        })
        .await
        .context("server error")?;

    shutdown.cancel();
    worker_handle.await.context("worker task panicked")?;
    Ok(())
}
