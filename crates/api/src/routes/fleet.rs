//! Fleet Routes

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::loaded_snapshot;
use crate::error::ApiError;
use crate::SharedState;
use fleet_sim::TrendPoint;
use fleet_stats::FleetSummary;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub refreshed_at: DateTime<Utc>,
    pub invalid_readings: usize,
    #[serde(flatten)]
    pub summary: FleetSummary,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub data: Vec<TrendPoint>,
}

/// Fleet-wide averages and counts
pub async fn get_summary(State(state): State<SharedState>) -> Result<Json<SummaryResponse>, ApiError> {
    let snapshot = loaded_snapshot(&state).await?;
    Ok(Json(SummaryResponse {
        refreshed_at: snapshot.refreshed_at,
        invalid_readings: snapshot.invalid_readings,
        summary: snapshot.summary.clone(),
    }))
}

/// Hourly fleet trend
pub async fn get_trend(State(state): State<SharedState>) -> Result<Json<TrendResponse>, ApiError> {
    let snapshot = loaded_snapshot(&state).await?;
    Ok(Json(TrendResponse {
        data: snapshot.trend.clone(),
    }))
}
