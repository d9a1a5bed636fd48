//! Axum request handlers for the view server.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use wifi_watch_scan::{NetworkIdentity, NetworkRecord, TriggerOutcome, ViewState};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::render::render_html;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: String,
    pub phase: String,
    pub cycle: u64,
    pub network_count: usize,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    pub uptime_secs: u64,
}

/// Body of `POST /api/v1/scan`.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    /// `started` or `already_in_flight`.
    pub outcome: &'static str,
    /// Cycle number of the view at the time of the request.
    pub cycle: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let scheduler = state.scheduler();
    let view = scheduler.snapshot();
    let phase = scheduler.phase();

    Json(HealthResponse {
        status: match phase {
            wifi_watch_scan::SchedulerPhase::ShutDown => "shutting_down",
            _ => "ok",
        },
        backend: scheduler.backend_name().to_string(),
        phase: phase.to_string(),
        cycle: view.cycle,
        network_count: view.networks.len(),
        loading: view.loading,
        error: view.error.clone(),
        last_updated: view.last_updated,
        uptime_secs: state.uptime().as_secs(),
    })
}

/// `GET /api/v1/view`
pub async fn get_view(State(state): State<AppState>) -> Json<ViewState> {
    Json(ViewState::clone(&state.scheduler().snapshot()))
}

/// `POST /api/v1/scan`
pub async fn trigger_scan(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<ScanResponse>)> {
    let scheduler = state.scheduler();
    let outcome = scheduler.scan_now();
    let cycle = scheduler.snapshot().cycle;

    match outcome {
        TriggerOutcome::Started => Ok((
            StatusCode::ACCEPTED,
            Json(ScanResponse {
                outcome: "started",
                cycle,
            }),
        )),
        TriggerOutcome::AlreadyInFlight => Ok((
            StatusCode::OK,
            Json(ScanResponse {
                outcome: "already_in_flight",
                cycle,
            }),
        )),
        TriggerOutcome::ShutDown => Err(ApiError::unavailable("scheduler is shutting down")),
    }
}

/// `GET /api/v1/networks/:identity`
///
/// `identity` uses the display form of [`NetworkIdentity`], e.g.
/// `hw:aa:bb:cc:dd:ee:ff` or `name:HomeNet`.
pub async fn get_network(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> ApiResult<Json<NetworkRecord>> {
    let identity: NetworkIdentity = identity.parse()?;
    let view = state.scheduler().snapshot();
    view.network(&identity)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::network_not_found(&identity))
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_html(&state.scheduler().snapshot()))
}

/// `GET /ws/view`
pub async fn ws_view(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_views(socket, state))
}

async fn stream_views(mut socket: WebSocket, state: AppState) {
    let mut views = state.scheduler().subscribe();
    let mut shutdown = state.shutdown_signal();
    info!("WebSocket client connected (view)");

    let current = views.borrow_and_update().clone();
    if send_view(&mut socket, &current).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                if send_view(&mut socket, &view).await.is_err() {
                    break;
                }
            }
            Ok(()) = shutdown.changed() => break,
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {} // ignore client messages
                }
            }
        }
    }

    info!("WebSocket client disconnected (view)");
}

async fn send_view(socket: &mut WebSocket, view: &ViewState) -> Result<(), axum::Error> {
    let json = serde_json::to_string(view).map_err(axum::Error::new)?;
    debug!(cycle = view.cycle, bytes = json.len(), "pushing view");
    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use wifi_watch_scan::{PollerConfig, PollingScheduler, SimulatedBackend};

    fn state_with(backend: SimulatedBackend) -> AppState {
        let scheduler = PollingScheduler::new(Arc::new(backend), PollerConfig::default()).unwrap();
        AppState::new(Arc::new(scheduler)).0
    }

    #[tokio::test]
    async fn view_and_health_reflect_the_scheduler() {
        let state = state_with(SimulatedBackend::new());
        state.scheduler().run_cycle().await;

        let Json(view) = get_view(State(state.clone())).await;
        assert_eq!(view.networks.len(), 6);
        assert!(!view.loading);

        let Json(h) = health(State(state)).await;
        assert_eq!(h.status, "ok");
        assert_eq!(h.backend, "simulated");
        assert_eq!(h.phase, "idle");
        assert_eq!(h.cycle, 1);
        assert_eq!(h.network_count, 6);
    }

    #[tokio::test]
    async fn select_network_by_identity() {
        let state = state_with(SimulatedBackend::new());
        state.scheduler().run_cycle().await;

        let Json(record) = get_network(State(state.clone()), Path("hw:3C-84-6A-10-22-01".into()))
            .await
            .unwrap();
        assert_eq!(record.display_name.as_deref(), Some("HomeNet"));
        assert_eq!(record.history.len(), 1);

        let missing = get_network(State(state.clone()), Path("name:Nowhere".into()))
            .await
            .unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let bad = get_network(State(state), Path("ssid=HomeNet".into()))
            .await
            .unwrap_err();
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn scan_trigger_reports_in_flight_and_shutdown() {
        let state = state_with(SimulatedBackend::new().with_latency(Duration::from_secs(2)));

        let (status, Json(body)) = trigger_scan(State(state.clone())).await.unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body.outcome, "started");

        let (status, Json(body)) = trigger_scan(State(state.clone())).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.outcome, "already_in_flight");

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(state.scheduler().snapshot().networks.len(), 6);

        state.scheduler().shutdown();
        let err = trigger_scan(State(state.clone())).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let Json(h) = health(State(state)).await;
        assert_eq!(h.status, "shutting_down");
    }

    #[tokio::test]
    async fn index_renders_the_table() {
        let state = state_with(SimulatedBackend::new());
        state.scheduler().run_cycle().await;

        let Html(page) = index(State(state)).await;
        assert!(page.contains("<table>"));
        assert!(page.contains("HomeNet"));
        assert!(page.contains("Hidden SSID"));
        assert!(page.contains("High Risk (Open/WEP)"));
    }
}
