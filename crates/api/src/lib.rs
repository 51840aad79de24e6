//! Purifier Fleet Dashboard API Server
//!
//! Read-only REST API over the latest fleet snapshot. A background poller
//! refreshes the snapshot; handlers never block on telemetry fetches.

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;

pub use config::{DashboardConfig, ServerConfig};
pub use error::{ApiError, ConfigError};
pub use rate_limit::{create_governor_config, RateLimitConfig};

use alerting::Classifier;
use data_validator::Normalizer;
use telemetry_client::{
    FleetPipeline, HttpSource, RefreshHandle, SnapshotStore, StaticSource, TelemetryPoller,
    TelemetrySource,
};
use telemetry_types::MaintenanceCall;

/// Application state shared across handlers
pub struct AppState {
    /// Latest fleet snapshot
    pub store: SnapshotStore,
    /// Triggers on-demand refreshes
    pub refresh: RefreshHandle,
    pub version: String,
    pub start_time: Instant,
    /// Prometheus handle, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Configured maintenance service calls
    pub maintenance: Vec<MaintenanceCall>,
}

impl AppState {
    pub fn new(store: SnapshotStore, refresh: RefreshHandle, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            store,
            refresh,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics,
            maintenance: Vec::new(),
        }
    }

    pub fn with_maintenance(mut self, calls: Vec<MaintenanceCall>) -> Self {
        self.maintenance = calls;
        self
    }
}

pub type SharedState = Arc<AppState>;

/// Create the application router
///
/// Rate limiting needs peer addresses, so it is layered on in `run_server`.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::system::health))
        .route("/api/v1/devices", get(routes::devices::list_devices))
        .route("/api/v1/devices/:id", get(routes::devices::get_device))
        .route("/api/v1/devices/:id/history", get(routes::devices::get_history))
        .route("/api/v1/fleet/summary", get(routes::fleet::get_summary))
        .route("/api/v1/fleet/trend", get(routes::fleet::get_trend))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .route("/api/v1/maintenance", get(routes::maintenance::list_calls))
        .route("/api/v1/maintenance/summary", get(routes::maintenance::get_summary))
        .route("/api/v1/refresh", post(routes::system::refresh))
        .route("/metrics", get(routes::system::metrics))
        .with_state(state)
}

/// Initialize logging; `RUST_LOG` overrides `default_level`
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn telemetry_source(config: &DashboardConfig) -> Box<dyn TelemetrySource> {
    let telemetry = &config.telemetry;
    if telemetry.endpoint.is_empty() {
        warn!("No telemetry endpoint configured, serving the built-in sample reading");
        Box::new(StaticSource::sample())
    } else {
        Box::new(HttpSource::new(
            &telemetry.endpoint,
            telemetry.device_id.clone(),
            telemetry.request_timeout(),
        ))
    }
}

/// Run the poller and the server until Ctrl-C
pub async fn run_server(config: DashboardConfig) -> anyhow::Result<()> {
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let store = SnapshotStore::new();
    let pipeline = FleetPipeline::new(
        Normalizer::new(config.validation.clone()),
        Classifier::new(config.alerts.clone()),
        config.fleet.clone(),
    );
    let (poller, refresh) = TelemetryPoller::new(
        telemetry_source(&config),
        pipeline,
        store.clone(),
        config.telemetry.refresh_interval(),
        config.fleet.seed,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller_task = tokio::spawn(poller.run(shutdown_rx));

    info!("Serving {} maintenance call(s)", config.maintenance.calls.len());
    let state = Arc::new(
        AppState::new(store, refresh, Some(metrics)).with_maintenance(config.maintenance.calls.clone()),
    );
    let mut app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    if config.rate_limit.enabled {
        let governor = create_governor_config(&config.rate_limit)?;
        app = app.layer(GovernorLayer { config: governor });
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Starting API server on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    poller_task.await?;
    info!("Server stopped");
    Ok(())
}
