//! HTTP and WebSocket surface for the live view.
//!
//! # Endpoints
//!
//! - `GET /` - HTML status page
//! - `GET /health` - liveness, scheduler phase and cycle count
//! - `GET /api/v1/view` - the current view as JSON
//! - `POST /api/v1/scan` - request an immediate scan
//! - `GET /api/v1/networks/:identity` - one network with its signal history
//! - `GET /ws/view` - pushes every published view as a JSON text frame

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use wifi_watch_scan::PollingScheduler;

use crate::ServeArgs;

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    scheduler: Arc<PollingScheduler>,
    started_at: Instant,
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Wrap `scheduler`. The returned sender flips to `true` when the server
    /// is shutting down, which closes open WebSocket streams.
    pub fn new(scheduler: Arc<PollingScheduler>) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let state = Self {
            scheduler,
            started_at: Instant::now(),
            shutdown: rx,
        };
        (state, tx)
    }

    /// The scheduler owning the published view.
    pub fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }

    /// Time since the state was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.clone()
    }
}

/// Build the router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/v1/view", get(handlers::get_view))
        .route("/api/v1/scan", post(handlers::trigger_scan))
        .route("/api/v1/networks/:identity", get(handlers::get_network))
        .route("/ws/view", get(handlers::ws_view))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Execute the serve command: start polling and serve until Ctrl-C.
pub async fn serve(args: ServeArgs) -> Result<()> {
    let scheduler = Arc::new(args.source.scheduler()?);
    scheduler.start();

    let (state, shutdown_tx) = AppState::new(Arc::clone(&scheduler));
    let app = create_router(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP port {addr}"))?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("HTTP server failed")?;

    scheduler.shutdown();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
    tx.send_replace(true);
}
