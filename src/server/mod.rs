//! HTTP surface of the service (axum).

mod handlers;
mod state;

pub use handlers::*;
pub use state::*;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::Deployer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio_util::task::TaskTracker;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/build-my-app", post(build_my_app))
}

/// Router with state, tracing and the body size limit applied.
pub fn build_app(state: AppState, max_body_mb: usize) -> Router {
    create_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(body_limit_bytes(max_body_mb))),
    )
}

fn body_limit_bytes(max_body_mb: usize) -> usize {
    max_body_mb.saturating_mul(1024 * 1024)
}

/// Stops accepting jobs and waits for the running ones to finish.
pub async fn drain_jobs(jobs: &TaskTracker) {
    jobs.close();
    let running = jobs.len();
    if running > 0 {
        info!("Waiting for {} background job(s) to finish...", running);
    }
    jobs.wait().await;
    info!("Drained {} background job(s)", running);
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config) -> Result<()> {
    let deployer = Deployer::from_config(config)?;
    let state = AppState::new(config.secret.as_str(), deployer);
    let jobs = state.jobs.clone();
    let app = build_app(state, config.server.max_body_mb);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_jobs(&jobs).await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
