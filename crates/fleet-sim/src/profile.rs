//! Sibling Device Profiles

use serde::{Deserialize, Serialize};
use telemetry_types::{DeviceStatus, FilterType};

/// How one displayed device is derived from the real reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Device id; `None` keeps the real reading's id
    #[serde(default)]
    pub device_id: Option<String>,
    pub location: String,
    /// Filter type; `None` keeps the real reading's type
    #[serde(default)]
    pub filter_type: Option<FilterType>,
    #[serde(default)]
    pub status: DeviceStatus,
    /// Inclusive range of the whole-ppm TDS offset
    #[serde(default)]
    pub tds_offset: (i32, i32),
    /// Symmetric flow jitter (L/min)
    #[serde(default)]
    pub flow_span: f64,
    /// Symmetric temperature jitter (°C)
    #[serde(default)]
    pub temperature_span: f64,
    /// Symmetric pH jitter
    #[serde(default)]
    pub ph_span: f64,
    /// Filter health is raised by a uniform amount in `[0, boost)`
    #[serde(default)]
    pub filter_boost: f64,
}

impl DeviceProfile {
    /// Profile that reproduces the real reading unchanged
    pub fn passthrough(location: &str) -> Self {
        Self {
            device_id: None,
            location: location.to_string(),
            filter_type: None,
            status: DeviceStatus::Online,
            tds_offset: (0, 0),
            flow_span: 0.0,
            temperature_span: 0.0,
            ph_span: 0.0,
            filter_boost: 0.0,
        }
    }
}

/// The business dashboard's four-device fleet
pub fn default_profiles() -> Vec<DeviceProfile> {
    vec![
        DeviceProfile::passthrough("Main Kitchen"),
        DeviceProfile {
            device_id: Some("224".to_string()),
            location: "Break Room".to_string(),
            filter_type: Some(FilterType::Uf),
            status: DeviceStatus::Online,
            tds_offset: (-15, 14),
            flow_span: 1.0,
            temperature_span: 2.0,
            ph_span: 0.3,
            filter_boost: 40.0,
        },
        DeviceProfile {
            device_id: Some("225".to_string()),
            location: "Reception Area".to_string(),
            filter_type: Some(FilterType::Uv),
            status: DeviceStatus::Maintenance,
            tds_offset: (-20, 19),
            flow_span: 0.75,
            temperature_span: 1.5,
            ph_span: 0.2,
            filter_boost: 20.0,
        },
        DeviceProfile {
            device_id: Some("226".to_string()),
            location: "Conference Room".to_string(),
            filter_type: Some(FilterType::Ro),
            status: DeviceStatus::Online,
            tds_offset: (-12, 12),
            flow_span: 1.5,
            temperature_span: 1.0,
            ph_span: 0.4,
            filter_boost: 60.0,
        },
    ]
}
