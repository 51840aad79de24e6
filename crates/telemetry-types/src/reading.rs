//! Telemetry Readings
//!
//! `RawReading` mirrors the remote endpoint's JSON record, where every
//! value arrives as text. `DeviceReading` is the normalized form used by
//! classification and aggregation.

use crate::device::{DeviceStatus, FilterType, Metric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Record as returned by the telemetry endpoint
///
/// The upstream schema spells temperature as `temprature`; the field keeps
/// that name on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub tds: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(
        rename = "temprature",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub filter_health: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Accept text, numbers or booleans and keep their textual form
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Num(serde_json::Number),
        Bool(bool),
    }

    Ok(Option::<Text>::deserialize(deserializer)?.map(|text| match text {
        Text::Str(s) => s,
        Text::Num(n) => n.to_string(),
        Text::Bool(b) => b.to_string(),
    }))
}

/// Normalized reading from a single purifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceReading {
    pub device_id: String,
    /// pH, nominally 0-14 but noisy sensors may report outside that
    pub ph: f64,
    /// Total dissolved solids (ppm)
    pub tds: u32,
    /// Water temperature (°C)
    pub temperature: f64,
    /// Flow rate (L/min)
    pub flow: f64,
    /// Remaining filter life (0-100 %)
    pub filter_health: f64,
    pub filter_type: FilterType,
    pub timestamp: DateTime<Utc>,
    pub status: DeviceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl DeviceReading {
    /// Numeric value of the given metric
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Ph => self.ph,
            Metric::Tds => self.tds as f64,
            Metric::Temperature => self.temperature,
            Metric::Flow => self.flow,
            Metric::FilterHealth => self.filter_health,
        }
    }
}
