//! Purifier Fleet Dashboard - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, DashboardConfig};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DashboardConfig::load(config_path.as_deref()).context("loading configuration")?;

    init_logging(&config.server.log_level)?;

    info!("=== Purifier Fleet Dashboard v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Fleet mode {:?}, refresh every {}s",
        config.fleet.mode, config.telemetry.refresh_interval_secs
    );

    run_server(config).await
}
