//! Maintenance Service Calls

use crate::device::{FilterType, ParseEnumError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Progress of a service call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl CallStatus {
    pub const ALL: [CallStatus; 3] = [CallStatus::Completed, CallStatus::InProgress, CallStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::InProgress => "in-progress",
            CallStatus::Completed => "completed",
        }
    }

    /// Label shown on the status badge
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Pending => "Pending",
            CallStatus::InProgress => "In Progress",
            CallStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(CallStatus::Pending),
            "in-progress" | "in_progress" => Ok(CallStatus::InProgress),
            "completed" => Ok(CallStatus::Completed),
            _ => Err(ParseEnumError {
                kind: "call status",
                value: s.to_string(),
            }),
        }
    }
}

/// Urgency assigned to a service call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl CallPriority {
    pub const ALL: [CallPriority; 3] = [CallPriority::High, CallPriority::Medium, CallPriority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallPriority::Low => "low",
            CallPriority::Medium => "medium",
            CallPriority::High => "high",
        }
    }
}

impl fmt::Display for CallPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(CallPriority::Low),
            "medium" => Ok(CallPriority::Medium),
            "high" => Ok(CallPriority::High),
            _ => Err(ParseEnumError {
                kind: "call priority",
                value: s.to_string(),
            }),
        }
    }
}

/// One maintenance request against a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceCall {
    pub id: String,
    pub device_id: String,
    pub customer_name: String,
    pub location: String,
    pub issue: String,
    pub priority: CallPriority,
    pub status: CallStatus,
    pub date_requested: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician_name: Option<String>,
    /// Filter type of the serviced device
    pub device_type: FilterType,
}

impl MaintenanceCall {
    /// Days from request to completion, if completed
    pub fn resolution_days(&self) -> Option<i64> {
        self.date_completed
            .map(|done| (done - self.date_requested).num_days())
    }
}
