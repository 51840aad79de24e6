//! Health, Refresh and Metrics Routes

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::SharedState;
use telemetry_client::{LoadState, RefreshFailure};

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: String,
    pub uptime_seconds: u64,
    pub state: String,
    pub device_count: Option<usize>,
    pub last_refresh: Option<DateTime<Utc>>,
    /// Latest refresh failure, until a refresh succeeds
    pub last_error: Option<RefreshFailure>,
}

/// Health check handler; answers 200 while loading too
///
/// Status is `degraded` while the latest refresh has failed.
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let load_state = state.store.state().await;
    let last_error = state.store.last_failure().await;
    let (device_count, last_refresh) = match &load_state {
        LoadState::Loaded(snapshot) => (Some(snapshot.devices.len()), Some(snapshot.refreshed_at)),
        LoadState::Loading => (None, None),
    };

    Json(HealthResponse {
        status: if last_error.is_some() { "degraded" } else { "healthy" }.to_string(),
        timestamp: Utc::now().timestamp(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        state: load_state.as_str().to_string(),
        device_count,
        last_refresh,
        last_error,
    })
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub accepted: bool,
}

/// Ask the poller for an immediate refresh
pub async fn refresh(State(state): State<SharedState>) -> Result<(StatusCode, Json<RefreshResponse>), ApiError> {
    if state.refresh.request() {
        info!("Refresh requested via API");
        Ok((StatusCode::ACCEPTED, Json(RefreshResponse { accepted: true })))
    } else {
        Err(ApiError::Unavailable("telemetry poller is not running".to_string()))
    }
}

/// Prometheus exposition
pub async fn metrics(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}
