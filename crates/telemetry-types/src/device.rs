//! Device Hardware and Connectivity Enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error when a text value names no known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Purification technology installed in a device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterType {
    /// Reverse osmosis
    #[default]
    Ro,
    /// Ultraviolet
    Uv,
    /// Ultra-filtration
    Uf,
}

impl FilterType {
    /// All filter types, in display order
    pub const ALL: [FilterType; 3] = [FilterType::Ro, FilterType::Uv, FilterType::Uf];

    /// Short code as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Ro => "RO",
            FilterType::Uv => "UV",
            FilterType::Uf => "UF",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RO" => Ok(FilterType::Ro),
            "UV" => Ok(FilterType::Uv),
            "UF" => Ok(FilterType::Uf),
            _ => Err(ParseEnumError {
                kind: "filter type",
                value: s.to_string(),
            }),
        }
    }
}

/// Connectivity state of a device, independent of its water metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Online,
    Offline,
    Maintenance,
}

impl DeviceStatus {
    /// All statuses, in display order
    pub const ALL: [DeviceStatus; 3] = [
        DeviceStatus::Online,
        DeviceStatus::Maintenance,
        DeviceStatus::Offline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(DeviceStatus::Online),
            "offline" => Ok(DeviceStatus::Offline),
            "maintenance" => Ok(DeviceStatus::Maintenance),
            _ => Err(ParseEnumError {
                kind: "device status",
                value: s.to_string(),
            }),
        }
    }
}

/// A measured water/device metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Acidity (pH units)
    Ph,
    /// Total dissolved solids (ppm)
    Tds,
    /// Water temperature (°C)
    Temperature,
    /// Flow rate (L/min)
    Flow,
    /// Remaining filter life (%)
    FilterHealth,
}

impl Metric {
    /// Field name used in logs and error messages
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::Ph => "ph",
            Metric::Tds => "tds",
            Metric::Temperature => "temperature",
            Metric::Flow => "flow",
            Metric::FilterHealth => "filter_health",
        }
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Ph => "pH",
            Metric::Tds => "ppm",
            Metric::Temperature => "°C",
            Metric::Flow => "L/min",
            Metric::FilterHealth => "%",
        }
    }
}
