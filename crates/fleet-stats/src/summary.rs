//! Fleet Summary Computation

use alerting::{AlertLevel, Classifier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use telemetry_types::{DeviceReading, DeviceStatus, FilterType};
use tracing::debug;

/// Fleet-wide aggregate of one refresh cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    /// Number of readings aggregated
    pub device_count: usize,
    pub avg_ph: f64,
    pub avg_tds: f64,
    pub avg_temperature: f64,
    pub avg_flow: f64,
    pub avg_filter_health: f64,
    /// Combined output of all devices (L/min)
    pub total_flow: f64,
    pub count_by_status: BTreeMap<DeviceStatus, usize>,
    pub count_by_alert_level: BTreeMap<AlertLevel, usize>,
    pub count_by_filter_type: BTreeMap<FilterType, usize>,
}

impl Default for FleetSummary {
    fn default() -> Self {
        Self {
            device_count: 0,
            avg_ph: 0.0,
            avg_tds: 0.0,
            avg_temperature: 0.0,
            avg_flow: 0.0,
            avg_filter_health: 0.0,
            total_flow: 0.0,
            count_by_status: DeviceStatus::ALL.iter().map(|&s| (s, 0)).collect(),
            count_by_alert_level: AlertLevel::ALL.iter().map(|&l| (l, 0)).collect(),
            count_by_filter_type: FilterType::ALL.iter().map(|&f| (f, 0)).collect(),
        }
    }
}

impl FleetSummary {
    /// Devices at the given alert level
    pub fn alert_count(&self, level: AlertLevel) -> usize {
        self.count_by_alert_level.get(&level).copied().unwrap_or(0)
    }

    /// Devices in the given connectivity state
    pub fn status_count(&self, status: DeviceStatus) -> usize {
        self.count_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Sum that does not depend on input order
///
/// Floating-point addition is not associative, so values are summed in
/// total order.
pub(crate) fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

/// Aggregate readings using the default thresholds
pub fn aggregate(readings: &[DeviceReading]) -> FleetSummary {
    aggregate_with(readings, &Classifier::default())
}

/// Aggregate readings, classifying each with `classifier`
pub fn aggregate_with(readings: &[DeviceReading], classifier: &Classifier) -> FleetSummary {
    let mut summary = FleetSummary::default();
    if readings.is_empty() {
        return summary;
    }

    let n = readings.len() as f64;
    let sum_of = |f: fn(&DeviceReading) -> f64| ordered_sum(readings.iter().map(f).collect());

    let total_flow = sum_of(|r| r.flow);
    summary.device_count = readings.len();
    summary.avg_ph = sum_of(|r| r.ph) / n;
    summary.avg_tds = sum_of(|r| r.tds as f64) / n;
    summary.avg_temperature = sum_of(|r| r.temperature) / n;
    summary.avg_flow = total_flow / n;
    summary.avg_filter_health = sum_of(|r| r.filter_health) / n;
    summary.total_flow = total_flow;

    for reading in readings {
        *summary.count_by_status.entry(reading.status).or_insert(0) += 1;
        *summary.count_by_filter_type.entry(reading.filter_type).or_insert(0) += 1;
        *summary
            .count_by_alert_level
            .entry(classifier.classify_reading(reading))
            .or_insert(0) += 1;
    }

    debug!(
        "Aggregated {} readings: avg pH {:.2}, total flow {:.1}, {} high alert(s)",
        summary.device_count,
        summary.avg_ph,
        summary.total_flow,
        summary.alert_count(AlertLevel::High)
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ph: f64, tds: u32, filter_health: f64) -> DeviceReading {
        DeviceReading {
            device_id: "223".to_string(),
            ph,
            tds,
            filter_health,
            ..Default::default()
        }
    }

    fn with_flow(flow: f64) -> DeviceReading {
        DeviceReading {
            flow,
            ..reading(7.0, 200, 80.0)
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary.device_count, 0);
        assert_eq!(summary.avg_ph, 0.0);
        assert_eq!(summary.avg_tds, 0.0);
        assert_eq!(summary.avg_temperature, 0.0);
        assert_eq!(summary.avg_flow, 0.0);
        assert_eq!(summary.total_flow, 0.0);
        assert_eq!(summary.alert_count(AlertLevel::High), 0);
        assert_eq!(summary.count_by_status.len(), 3);
    }

    #[test]
    fn test_flow_total_and_average() {
        let readings = vec![with_flow(1.5), with_flow(2.0), with_flow(0.5)];
        let summary = aggregate(&readings);
        assert!((summary.total_flow - 4.0).abs() < 1e-9);
        assert!((summary.avg_flow - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_alert_count() {
        let readings = vec![reading(7.0, 200, 50.0), reading(6.0, 200, 50.0)];
        let summary = aggregate(&readings);
        assert_eq!(summary.alert_count(AlertLevel::High), 1);
        assert_eq!(summary.alert_count(AlertLevel::Low), 1);
        assert_eq!(summary.alert_count(AlertLevel::Medium), 0);
        assert!((summary.avg_ph - 6.5).abs() < 1e-9);
        assert!((summary.avg_tds - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_and_filter_counts() {
        let readings = vec![
            DeviceReading {
                status: DeviceStatus::Maintenance,
                filter_type: FilterType::Uv,
                ..reading(7.0, 200, 80.0)
            },
            DeviceReading {
                filter_type: FilterType::Uf,
                ..reading(7.0, 200, 80.0)
            },
            reading(7.0, 200, 80.0),
        ];
        let summary = aggregate(&readings);
        assert_eq!(summary.status_count(DeviceStatus::Online), 2);
        assert_eq!(summary.status_count(DeviceStatus::Maintenance), 1);
        assert_eq!(summary.status_count(DeviceStatus::Offline), 0);
        assert_eq!(summary.count_by_filter_type[&FilterType::Ro], 1);
        assert_eq!(summary.count_by_filter_type[&FilterType::Uv], 1);
        assert_eq!(summary.count_by_filter_type[&FilterType::Uf], 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_reading() -> impl Strategy<Value = DeviceReading> {
            (5.0f64..10.0, 0u32..600, 0.0f64..100.0, 0.0f64..5.0, 10.0f64..45.0).prop_map(
                |(ph, tds, filter_health, flow, temperature)| DeviceReading {
                    flow,
                    temperature,
                    ..reading(ph, tds, filter_health)
                },
            )
        }

        proptest! {
            #[test]
            fn aggregate_is_order_independent(
                (readings, shuffled) in prop::collection::vec(arb_reading(), 0..20)
                    .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
            ) {
                prop_assert_eq!(aggregate(&readings), aggregate(&shuffled));
            }

            #[test]
            fn counts_add_up(readings in prop::collection::vec(arb_reading(), 0..20)) {
                let summary = aggregate(&readings);
                prop_assert_eq!(summary.count_by_alert_level.values().sum::<usize>(), readings.len());
                prop_assert_eq!(summary.count_by_status.values().sum::<usize>(), readings.len());
            }
        }
    }
}
