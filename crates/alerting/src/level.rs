//! Alert Levels and Display Grades

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use telemetry_types::ParseEnumError;

/// Composite or per-metric alert level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Normal operation
    #[default]
    Low,
    /// Needs attention soon
    Medium,
    /// Critical, requires action
    High,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 3] = [AlertLevel::Low, AlertLevel::Medium, AlertLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "low",
            AlertLevel::Medium => "medium",
            AlertLevel::High => "high",
        }
    }

    /// Badge text shown next to a device
    pub fn badge_label(&self) -> &'static str {
        match self {
            AlertLevel::Low => "Normal",
            AlertLevel::Medium => "Warning",
            AlertLevel::High => "Alert",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(AlertLevel::Low),
            "medium" => Ok(AlertLevel::Medium),
            "high" => Ok(AlertLevel::High),
            _ => Err(ParseEnumError {
                kind: "alert level",
                value: s.to_string(),
            }),
        }
    }
}

/// Per-metric quality grade used by the single-device analytics view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Optimal,
    NeedsAttention,
    Excellent,
    Good,
    Poor,
    ReplaceSoon,
    ReplaceNow,
    /// Metric has no grading thresholds
    Normal,
}

impl QualityGrade {
    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::Optimal => "Optimal",
            QualityGrade::NeedsAttention => "Needs Attention",
            QualityGrade::Excellent => "Excellent",
            QualityGrade::Good => "Good",
            QualityGrade::Poor => "Poor",
            QualityGrade::ReplaceSoon => "Replace Soon",
            QualityGrade::ReplaceNow => "Replace Now",
            QualityGrade::Normal => "Normal",
        }
    }
}
