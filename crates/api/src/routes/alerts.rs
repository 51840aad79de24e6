//! Alert Routes

use axum::{extract::State, Json};
use serde::Serialize;

use super::loaded_snapshot;
use crate::error::ApiError;
use crate::SharedState;
use alerting::ActiveAlert;

/// Response for alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub data: Vec<ActiveAlert>,
    pub count: usize,
}

/// Devices currently at high alert
pub async fn get_alerts(State(state): State<SharedState>) -> Result<Json<AlertResponse>, ApiError> {
    let snapshot = loaded_snapshot(&state).await?;
    Ok(Json(AlertResponse {
        count: snapshot.alerts.len(),
        data: snapshot.alerts.clone(),
    }))
}
