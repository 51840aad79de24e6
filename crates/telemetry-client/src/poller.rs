//! Periodic Telemetry Refresh
//!
//! A single task owns the source and the random generator. Scheduled ticks
//! and on-demand requests are served from one loop, so at most one fetch is
//! ever in flight and each result replaces the shared snapshot wholesale.

use crate::error::FetchError;
use crate::pipeline::{FleetPipeline, FleetSnapshot};
use crate::source::TelemetrySource;
use crate::store::SnapshotStore;
use alerting::AlertLevel;
use chrono::Utc;
use metrics::{counter, gauge};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Requests an immediate refresh from a running poller
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Queue a refresh; returns false when the poller is gone
    ///
    /// A request made while another is already queued is merged into it.
    pub fn request(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }
}

/// Telemetry poller
pub struct TelemetryPoller<S: TelemetrySource> {
    source: S,
    pipeline: FleetPipeline,
    store: SnapshotStore,
    interval: Duration,
    rng: StdRng,
    refresh_rx: mpsc::Receiver<()>,
}

impl<S: TelemetrySource> TelemetryPoller<S> {
    /// Create a poller and the handle used to trigger on-demand refreshes
    ///
    /// A fixed `seed` makes the synthesized fleet reproducible.
    pub fn new(
        source: S,
        pipeline: FleetPipeline,
        store: SnapshotStore,
        interval: Duration,
        seed: Option<u64>,
    ) -> (Self, RefreshHandle) {
        let (tx, refresh_rx) = mpsc::channel(1);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            "Telemetry poller created for {} every {:?}",
            source.describe(),
            interval
        );

        let poller = Self {
            source,
            pipeline,
            store,
            interval,
            rng,
            refresh_rx,
        };
        (poller, RefreshHandle { tx })
    }

    /// Fetch once and replace the snapshot
    ///
    /// On failure the old snapshot stays, or an empty one is served if none
    /// was ever loaded.
    pub async fn refresh_once(&mut self) -> Result<(), FetchError> {
        counter!("telemetry_refresh_total").increment(1);
        let started = Instant::now();

        let raw = match self.source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                counter!("telemetry_refresh_failures_total").increment(1);
                self.store.record_failure(e.to_string(), Utc::now()).await;
                return Err(e);
            }
        };

        let snapshot = self.pipeline.build_snapshot(&raw, Utc::now(), &mut self.rng);
        record_metrics(&snapshot);
        self.store.replace(snapshot).await;

        debug!("Refresh completed in {:?}", started.elapsed());
        Ok(())
    }

    /// Run until `shutdown` flips or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting telemetry poller");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                Some(()) = self.refresh_rx.recv() => {
                    debug!("On-demand refresh requested");
                }
                _ = shutdown.changed() => break,
            }

            if let Err(e) = self.refresh_once().await {
                warn!("Telemetry refresh failed, keeping previous state: {}", e);
            }
        }

        info!("Telemetry poller stopped");
    }
}

fn record_metrics(snapshot: &FleetSnapshot) {
    let summary = &snapshot.summary;
    gauge!("fleet_devices").set(summary.device_count as f64);
    gauge!("fleet_avg_ph").set(summary.avg_ph);
    gauge!("fleet_avg_tds").set(summary.avg_tds);
    gauge!("fleet_total_flow").set(summary.total_flow);
    gauge!("fleet_high_alerts").set(summary.alert_count(AlertLevel::High) as f64);
    counter!("telemetry_invalid_readings_total").increment(snapshot.invalid_readings as u64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FleetConfig, FleetMode};
    use crate::source::StaticSource;
    use crate::store::LoadState;
    use alerting::Classifier;
    use async_trait::async_trait;
    use data_validator::Normalizer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use telemetry_types::RawReading;

    /// Succeeds on the first fetch, fails afterwards
    struct FlakySource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TelemetrySource for FlakySource {
        async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                StaticSource::sample().fetch().await
            } else {
                Err(FetchError::Status(502))
            }
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    /// Never answers successfully
    struct DownSource;

    #[async_trait]
    impl TelemetrySource for DownSource {
        async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
            Err(FetchError::Status(502))
        }

        fn describe(&self) -> String {
            "down".to_string()
        }
    }

    fn pipeline() -> FleetPipeline {
        FleetPipeline::new(
            Normalizer::default(),
            Classifier::default(),
            FleetConfig {
                mode: FleetMode::Passthrough,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_refresh_replaces_state() {
        let store = SnapshotStore::new();
        assert!(!store.state().await.is_loaded());

        let (mut poller, _handle) = TelemetryPoller::new(
            StaticSource::sample(),
            pipeline(),
            store.clone(),
            Duration::from_secs(30),
            Some(1),
        );
        poller.refresh_once().await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.devices[0].reading.device_id, "223");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let store = SnapshotStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FlakySource {
            calls: Arc::clone(&calls),
        };
        let (mut poller, _handle) =
            TelemetryPoller::new(source, pipeline(), store.clone(), Duration::from_secs(30), Some(1));

        poller.refresh_once().await.unwrap();
        let first = store.snapshot().await.unwrap();

        assert!(matches!(poller.refresh_once().await, Err(FetchError::Status(502))));
        let after = store.snapshot().await.unwrap();
        assert_eq!(first.refreshed_at, after.refreshed_at);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_source_serves_empty_fleet() {
        let store = SnapshotStore::new();
        let (mut poller, _handle) =
            TelemetryPoller::new(DownSource, pipeline(), store.clone(), Duration::from_secs(30), Some(1));

        assert!(poller.refresh_once().await.is_err());

        let snapshot = store.snapshot().await.unwrap();
        assert!(snapshot.devices.is_empty());
        let failure = store.last_failure().await.unwrap();
        assert!(failure.message.contains("502"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_failures_stay_loaded_and_empty() {
        let store = SnapshotStore::new();
        let (poller, _handle) =
            TelemetryPoller::new(DownSource, pipeline(), store.clone(), Duration::from_secs(30), Some(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(poller.run(shutdown_rx));

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(store.state().await.as_str(), "loaded");
        assert!(store.last_failure().await.is_some());

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_refreshes_on_schedule_and_on_demand() {
        let store = SnapshotStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FlakySource {
            calls: Arc::clone(&calls),
        };
        let (poller, handle) =
            TelemetryPoller::new(source, pipeline(), store.clone(), Duration::from_secs(30), Some(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(poller.run(shutdown_rx));

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(store.state().await, LoadState::Loaded(_)));

        assert!(handle.request());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
        assert!(!handle.request());
    }
}
