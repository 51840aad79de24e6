//! Maintenance Call Statistics

use crate::summary::ordered_sum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use telemetry_types::{CallPriority, CallStatus, FilterType, MaintenanceCall};

/// Counts and rates over a set of maintenance calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSummary {
    pub total_calls: usize,
    pub count_by_status: BTreeMap<CallStatus, usize>,
    pub count_by_priority: BTreeMap<CallPriority, usize>,
    pub count_by_device_type: BTreeMap<FilterType, usize>,
    /// Completed calls as a percentage of all calls; 0 with no calls
    pub completion_rate: f64,
    /// Mean days from request to completion over completed calls
    pub avg_resolution_days: Option<f64>,
}

impl Default for MaintenanceSummary {
    fn default() -> Self {
        Self {
            total_calls: 0,
            count_by_status: CallStatus::ALL.iter().map(|&s| (s, 0)).collect(),
            count_by_priority: CallPriority::ALL.iter().map(|&p| (p, 0)).collect(),
            count_by_device_type: FilterType::ALL.iter().map(|&f| (f, 0)).collect(),
            completion_rate: 0.0,
            avg_resolution_days: None,
        }
    }
}

impl MaintenanceSummary {
    pub fn status_count(&self, status: CallStatus) -> usize {
        self.count_by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn priority_count(&self, priority: CallPriority) -> usize {
        self.count_by_priority.get(&priority).copied().unwrap_or(0)
    }
}

/// Summarize maintenance calls
pub fn maintenance_summary(calls: &[MaintenanceCall]) -> MaintenanceSummary {
    let mut summary = MaintenanceSummary::default();
    if calls.is_empty() {
        return summary;
    }

    for call in calls {
        *summary.count_by_status.entry(call.status).or_insert(0) += 1;
        *summary.count_by_priority.entry(call.priority).or_insert(0) += 1;
        *summary.count_by_device_type.entry(call.device_type).or_insert(0) += 1;
    }

    summary.total_calls = calls.len();
    summary.completion_rate =
        summary.status_count(CallStatus::Completed) as f64 / calls.len() as f64 * 100.0;

    let resolutions: Vec<f64> = calls
        .iter()
        .filter(|c| c.status == CallStatus::Completed)
        .filter_map(MaintenanceCall::resolution_days)
        .map(|days| days as f64)
        .collect();
    if !resolutions.is_empty() {
        let n = resolutions.len() as f64;
        summary.avg_resolution_days = Some(ordered_sum(resolutions) / n);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn call(
        id: &str,
        priority: CallPriority,
        status: CallStatus,
        device_type: FilterType,
        days: Option<i64>,
    ) -> MaintenanceCall {
        let requested = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        MaintenanceCall {
            id: id.to_string(),
            device_id: "223".to_string(),
            customer_name: "Facilities".to_string(),
            location: "Main Kitchen".to_string(),
            issue: "Routine service".to_string(),
            priority,
            status,
            date_requested: requested,
            date_completed: days.map(|d| requested + chrono::Duration::days(d)),
            technician_name: None,
            device_type,
        }
    }

    #[test]
    fn test_empty_calls() {
        let summary = maintenance_summary(&[]);
        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.avg_resolution_days, None);
        assert_eq!(summary.count_by_status.len(), 3);
        assert_eq!(summary.status_count(CallStatus::Pending), 0);
    }

    #[test]
    fn test_counts_and_completion_rate() {
        use CallPriority::*;
        use CallStatus::*;
        let calls = vec![
            call("M001", High, Pending, FilterType::Uf, None),
            call("M002", Medium, InProgress, FilterType::Uf, None),
            call("M003", High, Completed, FilterType::Uv, Some(1)),
            call("M004", Low, Completed, FilterType::Ro, Some(1)),
            call("M005", High, Completed, FilterType::Ro, Some(1)),
            call("M006", Medium, Completed, FilterType::Uf, Some(1)),
            call("M007", High, Completed, FilterType::Ro, Some(1)),
            call("M008", Low, Completed, FilterType::Uv, Some(3)),
        ];
        let summary = maintenance_summary(&calls);

        assert_eq!(summary.total_calls, 8);
        assert_eq!(summary.status_count(Completed), 6);
        assert_eq!(summary.status_count(InProgress), 1);
        assert_eq!(summary.status_count(Pending), 1);
        assert_eq!(summary.priority_count(High), 4);
        assert_eq!(summary.priority_count(Medium), 2);
        assert_eq!(summary.priority_count(Low), 2);
        assert_eq!(summary.count_by_device_type[&FilterType::Ro], 3);
        assert_eq!(summary.count_by_device_type[&FilterType::Uf], 3);
        assert_eq!(summary.count_by_device_type[&FilterType::Uv], 2);
        assert!((summary.completion_rate - 75.0).abs() < 1e-9);
        assert_eq!(summary.avg_resolution_days, Some(8.0 / 6.0));
    }

    #[test]
    fn test_no_completed_calls() {
        let calls = vec![call("M001", CallPriority::Low, CallStatus::Pending, FilterType::Ro, None)];
        let summary = maintenance_summary(&calls);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.avg_resolution_days, None);
    }
}
