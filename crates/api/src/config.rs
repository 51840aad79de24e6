//! Dashboard Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `PURIFIER__SECTION__KEY` environment variables.

use crate::error::ConfigError;
use crate::rate_limit::RateLimitConfig;
use alerting::AlertConfig;
use config::{Config, Environment, File, FileFormat};
use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use telemetry_client::{FleetConfig, TelemetryConfig};
use telemetry_types::MaintenanceCall;
use tracing::info;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/dashboard.toml";

/// Environment variable holding an explicit config file path
pub const CONFIG_PATH_ENV: &str = "PURIFIER_CONFIG";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Maintenance service calls shown on the maintenance dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub calls: Vec<MaintenanceCall>,
}

/// Full dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub fleet: FleetConfig,
    pub alerts: AlertConfig,
    pub validation: ValidationConfig,
    pub rate_limit: RateLimitConfig,
    pub maintenance: MaintenanceConfig,
}

impl DashboardConfig {
    /// Load from `path`, or from `PURIFIER_CONFIG`, or from the default file
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let file = match &explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                File::from(path.as_path()).format(FileFormat::Toml).required(true)
            }
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let config: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PURIFIER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        info!(
            "Configuration loaded (source: {})",
            explicit
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
        );
        Ok(config)
    }

    /// Reject settings the dashboard cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let alerts = &self.alerts;
        if !(alerts.ph_min < alerts.ph_max) {
            return Err(ConfigError::Invalid(format!(
                "alerts.ph_min ({}) must be below alerts.ph_max ({})",
                alerts.ph_min, alerts.ph_max
            )));
        }
        if alerts.tds_medium_above > alerts.tds_high_above {
            return Err(ConfigError::Invalid(format!(
                "alerts.tds_medium_above ({}) cannot exceed alerts.tds_high_above ({})",
                alerts.tds_medium_above, alerts.tds_high_above
            )));
        }
        if alerts.filter_high_below > alerts.filter_medium_below {
            return Err(ConfigError::Invalid(format!(
                "alerts.filter_high_below ({}) cannot exceed alerts.filter_medium_below ({})",
                alerts.filter_high_below, alerts.filter_medium_below
            )));
        }
        if self.telemetry.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "telemetry.refresh_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.rate_limit.enabled && (self.rate_limit.per_second == 0 || self.rate_limit.burst_size == 0) {
            return Err(ConfigError::Invalid(
                "rate_limit.per_second and rate_limit.burst_size must be greater than 0".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for call in &self.maintenance.calls {
            if !ids.insert(call.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate maintenance call id {}",
                    call.id
                )));
            }
            if call.date_completed.is_some_and(|done| done < call.date_requested) {
                return Err(ConfigError::Invalid(format!(
                    "maintenance call {} completed before it was requested",
                    call.id
                )));
            }
        }
        Ok(())
    }
}
