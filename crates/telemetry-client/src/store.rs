//! Shared Snapshot State

use crate::pipeline::FleetSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Whether a first snapshot has been produced yet
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded(Arc<FleetSnapshot>),
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Loading => "loading",
            LoadState::Loaded(_) => "loaded",
        }
    }
}

/// Most recent refresh failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshFailure {
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    state: LoadState,
    last_failure: Option<RefreshFailure>,
}

/// Latest fleet snapshot, replaced wholesale on each refresh
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Inner>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub async fn state(&self) -> LoadState {
        self.inner.read().await.state.clone()
    }

    /// Current snapshot, if loaded
    pub async fn snapshot(&self) -> Option<Arc<FleetSnapshot>> {
        match &self.inner.read().await.state {
            LoadState::Loaded(snapshot) => Some(Arc::clone(snapshot)),
            LoadState::Loading => None,
        }
    }

    /// Failure of the latest refresh; cleared by the next success
    pub async fn last_failure(&self) -> Option<RefreshFailure> {
        self.inner.read().await.last_failure.clone()
    }

    /// Replace whatever was there with a new snapshot
    pub async fn replace(&self, snapshot: FleetSnapshot) {
        debug!("Replacing fleet snapshot ({} devices)", snapshot.devices.len());
        let mut inner = self.inner.write().await;
        inner.state = LoadState::Loaded(Arc::new(snapshot));
        inner.last_failure = None;
    }

    /// Record a failed refresh
    ///
    /// A loaded snapshot is kept. Without one the store moves to an empty
    /// snapshot so readers stop waiting on a first load that may never come.
    pub async fn record_failure(&self, message: String, at: DateTime<Utc>) {
        let mut inner = self.inner.write().await;
        if !inner.state.is_loaded() {
            warn!("First telemetry refresh failed, serving an empty fleet");
            inner.state = LoadState::Loaded(Arc::new(FleetSnapshot::empty(at)));
        }
        inner.last_failure = Some(RefreshFailure { message, at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_failure_before_first_load_serves_empty_fleet() {
        let store = SnapshotStore::new();
        store.record_failure("status 502".to_string(), at()).await;

        let snapshot = store.snapshot().await.unwrap();
        assert!(snapshot.devices.is_empty());
        assert_eq!(snapshot.summary.device_count, 0);
        assert_eq!(
            store.last_failure().await,
            Some(RefreshFailure {
                message: "status 502".to_string(),
                at: at(),
            })
        );
    }

    #[tokio::test]
    async fn test_success_clears_failure() {
        let store = SnapshotStore::new();
        store.record_failure("timeout".to_string(), at()).await;
        store.replace(FleetSnapshot::empty(at())).await;
        assert!(store.last_failure().await.is_none());
    }
}
