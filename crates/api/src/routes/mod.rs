//! Route Handlers

pub mod alerts;
pub mod devices;
pub mod fleet;
pub mod maintenance;
pub mod system;

use crate::error::ApiError;
use crate::SharedState;
use std::sync::Arc;
use telemetry_client::FleetSnapshot;

/// Latest snapshot, or 503 while the first refresh is outstanding
pub(crate) async fn loaded_snapshot(state: &SharedState) -> Result<Arc<FleetSnapshot>, ApiError> {
    state.store.snapshot().await.ok_or(ApiError::Loading)
}
