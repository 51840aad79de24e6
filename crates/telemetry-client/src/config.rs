//! Telemetry and Fleet Configuration

use fleet_sim::{default_profiles, DeviceProfile, GeneratedFleetConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where and how often to fetch telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Endpoint URL; empty serves a built-in sample reading instead
    pub endpoint: String,
    /// Sent as the `device_id` query parameter when set
    pub device_id: Option<String>,
    /// Seconds between scheduled refreshes
    pub refresh_interval_secs: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            device_id: Some("223".to_string()),
            refresh_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl TelemetryConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// How the displayed fleet is derived from fetched readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetMode {
    /// Real reading plus jittered siblings from `profiles`
    #[default]
    Jittered,
    /// Uniformly generated fleet of `generated.count` devices
    Generated,
    /// Fetched readings only
    Passthrough,
}

/// Fleet synthesis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub mode: FleetMode,
    pub profiles: Vec<DeviceProfile>,
    pub generated: GeneratedFleetConfig,
    /// Fixed RNG seed; unset seeds from entropy
    pub seed: Option<u64>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            mode: FleetMode::default(),
            profiles: default_profiles(),
            generated: GeneratedFleetConfig::default(),
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let telemetry = TelemetryConfig::default();
        assert_eq!(telemetry.refresh_interval(), Duration::from_secs(30));

        let fleet = FleetConfig::default();
        assert_eq!(fleet.mode, FleetMode::Jittered);
        assert_eq!(fleet.profiles.len(), 4);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let telemetry = TelemetryConfig {
            refresh_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(telemetry.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_mode_from_json() {
        let fleet: FleetConfig = serde_json::from_str(r#"{ "mode": "generated" }"#).unwrap();
        assert_eq!(fleet.mode, FleetMode::Generated);
        assert_eq!(fleet.generated.count, 40);
    }
}
