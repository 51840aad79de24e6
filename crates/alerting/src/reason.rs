//! Alert Reasons and Active Alert List

use crate::classifier::ClassifiedDevice;
use crate::level::AlertLevel;
use serde::{Deserialize, Serialize};

/// A threshold a reading crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    /// Filter health below the critical threshold
    FilterReplacement,
    /// pH outside the acceptable band
    PhOutOfRange,
    /// TDS above the critical threshold
    HighTds,
    /// Filter health in the warning band
    FilterWearing,
    /// TDS in the warning band
    ElevatedTds,
}

impl AlertReason {
    /// Level this reason contributes
    pub fn level(&self) -> AlertLevel {
        match self {
            AlertReason::FilterReplacement | AlertReason::PhOutOfRange | AlertReason::HighTds => {
                AlertLevel::High
            }
            AlertReason::FilterWearing | AlertReason::ElevatedTds => AlertLevel::Medium,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AlertReason::FilterReplacement => "Filter needs replacement",
            AlertReason::PhOutOfRange => "pH out of range",
            AlertReason::HighTds => "High TDS levels",
            AlertReason::FilterWearing => "Filter replacement due soon",
            AlertReason::ElevatedTds => "Elevated TDS levels",
        }
    }
}

/// A device that requires immediate attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAlert {
    pub device_id: String,
    pub location: Option<String>,
    pub reasons: Vec<AlertReason>,
    /// Critical reasons joined for display
    pub message: String,
}

/// High-level devices with their critical reasons, in input order
pub fn active_alerts(devices: &[ClassifiedDevice]) -> Vec<ActiveAlert> {
    devices
        .iter()
        .filter(|device| device.alert_level == AlertLevel::High)
        .map(|device| {
            let reasons: Vec<AlertReason> = device
                .reasons
                .iter()
                .copied()
                .filter(|reason| reason.level() == AlertLevel::High)
                .collect();
            let message = reasons
                .iter()
                .map(AlertReason::message)
                .collect::<Vec<_>>()
                .join(" • ");
            ActiveAlert {
                device_id: device.reading.device_id.clone(),
                location: device.reading.location.clone(),
                reasons,
                message,
            }
        })
        .collect()
}
