//! Maintenance Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::SharedState;
use fleet_stats::{maintenance_summary, MaintenanceSummary};
use telemetry_types::{CallPriority, CallStatus, MaintenanceCall, ParseEnumError};

/// Query parameters for the maintenance call list
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceQuery {
    /// `pending`, `in-progress` or `completed`
    pub status: Option<String>,
    /// `low`, `medium` or `high`
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub data: Vec<MaintenanceCall>,
    pub meta: MaintenanceMeta,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceMeta {
    pub count: usize,
    pub total: usize,
}

fn bad_request(e: ParseEnumError) -> ApiError {
    ApiError::BadRequest(e.to_string())
}

/// List maintenance calls
pub async fn list_calls(
    State(state): State<SharedState>,
    Query(params): Query<MaintenanceQuery>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    let status: Option<CallStatus> = params.status.as_deref().map(str::parse).transpose().map_err(bad_request)?;
    let priority: Option<CallPriority> =
        params.priority.as_deref().map(str::parse).transpose().map_err(bad_request)?;

    let data: Vec<MaintenanceCall> = state
        .maintenance
        .iter()
        .filter(|c| status.map_or(true, |status| c.status == status))
        .filter(|c| priority.map_or(true, |priority| c.priority == priority))
        .cloned()
        .collect();

    Ok(Json(MaintenanceResponse {
        meta: MaintenanceMeta {
            count: data.len(),
            total: state.maintenance.len(),
        },
        data,
    }))
}

/// Counts by status, priority and device type plus completion rate
pub async fn get_summary(State(state): State<SharedState>) -> Json<MaintenanceSummary> {
    Json(maintenance_summary(&state.maintenance))
}
