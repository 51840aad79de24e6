//! Device Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::loaded_snapshot;
use crate::error::ApiError;
use crate::SharedState;
use alerting::{AlertLevel, ClassifiedDevice};
use fleet_sim::HistoryPoint;
use telemetry_types::DeviceStatus;

/// Query parameters for the device list
#[derive(Debug, Default, Deserialize)]
pub struct DeviceQuery {
    /// `low`, `medium` or `high`
    pub level: Option<String>,
    /// `online`, `offline` or `maintenance`
    pub status: Option<String>,
}

impl DeviceQuery {
    fn level(&self) -> Result<Option<AlertLevel>, ApiError> {
        self.level
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: telemetry_types::ParseEnumError| ApiError::BadRequest(e.to_string()))
    }

    fn status(&self) -> Result<Option<DeviceStatus>, ApiError> {
        self.status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: telemetry_types::ParseEnumError| ApiError::BadRequest(e.to_string()))
    }
}

/// Response for the device list
#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub data: Vec<ClassifiedDevice>,
    pub meta: DeviceMeta,
}

#[derive(Debug, Serialize)]
pub struct DeviceMeta {
    pub count: usize,
    pub total: usize,
    pub refreshed_at: DateTime<Utc>,
}

/// Response for a device history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub device_id: String,
    pub data: Vec<HistoryPoint>,
}

/// List classified devices
pub async fn list_devices(
    State(state): State<SharedState>,
    Query(params): Query<DeviceQuery>,
) -> Result<Json<DeviceListResponse>, ApiError> {
    let level = params.level()?;
    let status = params.status()?;
    let snapshot = loaded_snapshot(&state).await?;

    let data: Vec<ClassifiedDevice> = snapshot
        .devices
        .iter()
        .filter(|d| level.map_or(true, |level| d.alert_level == level))
        .filter(|d| status.map_or(true, |status| d.reading.status == status))
        .cloned()
        .collect();

    Ok(Json(DeviceListResponse {
        meta: DeviceMeta {
            count: data.len(),
            total: snapshot.devices.len(),
            refreshed_at: snapshot.refreshed_at,
        },
        data,
    }))
}

/// One classified device
pub async fn get_device(
    State(state): State<SharedState>,
    Path(device_id): Path<String>,
) -> Result<Json<ClassifiedDevice>, ApiError> {
    let snapshot = loaded_snapshot(&state).await?;
    snapshot
        .device(&device_id)
        .cloned()
        .map(Json)
        .ok_or(ApiError::DeviceNotFound(device_id))
}

/// 24-hour history of one device
pub async fn get_history(
    State(state): State<SharedState>,
    Path(device_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let snapshot = loaded_snapshot(&state).await?;
    let data = snapshot
        .history(&device_id)
        .map(<[HistoryPoint]>::to_vec)
        .ok_or_else(|| ApiError::DeviceNotFound(device_id.clone()))?;

    Ok(Json(HistoryResponse { device_id, data }))
}
