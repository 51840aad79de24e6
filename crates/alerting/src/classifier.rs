//! Threshold Classifier

use crate::level::{AlertLevel, QualityGrade};
use crate::reason::AlertReason;
use serde::{Deserialize, Serialize};
use telemetry_types::{DeviceReading, Metric};
use tracing::info;

/// Classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Lowest acceptable pH (inclusive)
    pub ph_min: f64,
    /// Highest acceptable pH (inclusive)
    pub ph_max: f64,
    /// TDS above this is medium (ppm)
    pub tds_medium_above: u32,
    /// TDS above this is high (ppm)
    pub tds_high_above: u32,
    /// Filter health below this is medium (%)
    pub filter_medium_below: f64,
    /// Filter health below this is high (%)
    pub filter_high_below: f64,
    /// Upper TDS bound graded Good rather than Poor (ppm)
    pub tds_good_max: u32,
    /// Filter health above this is graded Good (%)
    pub filter_good_above: f64,
    /// Filter health above this (and not Good) is graded Replace Soon (%)
    pub filter_replace_soon_above: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            ph_min: 6.5,
            ph_max: 8.5,
            tds_medium_above: 250,
            tds_high_above: 300,
            filter_medium_below: 40.0,
            filter_high_below: 20.0,
            tds_good_max: 500,
            filter_good_above: 20.0,
            filter_replace_soon_above: 10.0,
        }
    }
}

/// A reading together with its derived alert state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedDevice {
    #[serde(flatten)]
    pub reading: DeviceReading,
    pub alert_level: AlertLevel,
    pub reasons: Vec<AlertReason>,
    /// False when normalization had to substitute or flag a field
    pub valid: bool,
}

/// Stateless threshold classifier
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: AlertConfig,
}

impl Classifier {
    /// Create a classifier with the given thresholds
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating classifier with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    fn ph_out_of_range(&self, ph: f64) -> bool {
        !ph.is_finite() || ph < self.config.ph_min || ph > self.config.ph_max
    }

    fn filter_critical(&self, health: f64) -> bool {
        !health.is_finite() || health < self.config.filter_high_below
    }

    /// Classify a single metric value
    ///
    /// Non-finite pH, TDS or filter health classify as high. Temperature
    /// and flow carry no thresholds and are always low.
    pub fn classify(&self, value: f64, metric: Metric) -> AlertLevel {
        match metric {
            Metric::Ph => {
                if self.ph_out_of_range(value) {
                    AlertLevel::High
                } else {
                    AlertLevel::Low
                }
            }
            Metric::Tds => {
                if !value.is_finite() || value > self.config.tds_high_above as f64 {
                    AlertLevel::High
                } else if value > self.config.tds_medium_above as f64 {
                    AlertLevel::Medium
                } else {
                    AlertLevel::Low
                }
            }
            Metric::FilterHealth => {
                if self.filter_critical(value) {
                    AlertLevel::High
                } else if value < self.config.filter_medium_below {
                    AlertLevel::Medium
                } else {
                    AlertLevel::Low
                }
            }
            Metric::Temperature | Metric::Flow => AlertLevel::Low,
        }
    }

    /// Composite level across filter health, pH and TDS
    ///
    /// The high check runs first: its conditions overlap the medium ones.
    pub fn classify_reading(&self, reading: &DeviceReading) -> AlertLevel {
        let cfg = &self.config;
        if self.filter_critical(reading.filter_health)
            || self.ph_out_of_range(reading.ph)
            || reading.tds > cfg.tds_high_above
        {
            return AlertLevel::High;
        }
        if reading.filter_health < cfg.filter_medium_below || reading.tds > cfg.tds_medium_above {
            return AlertLevel::Medium;
        }
        AlertLevel::Low
    }

    /// Every threshold the reading crosses, most severe first
    pub fn reasons(&self, reading: &DeviceReading) -> Vec<AlertReason> {
        let cfg = &self.config;
        let mut reasons = Vec::new();

        if self.filter_critical(reading.filter_health) {
            reasons.push(AlertReason::FilterReplacement);
        }
        if self.ph_out_of_range(reading.ph) {
            reasons.push(AlertReason::PhOutOfRange);
        }
        if reading.tds > cfg.tds_high_above {
            reasons.push(AlertReason::HighTds);
        }
        if !self.filter_critical(reading.filter_health)
            && reading.filter_health < cfg.filter_medium_below
        {
            reasons.push(AlertReason::FilterWearing);
        }
        if reading.tds > cfg.tds_medium_above && reading.tds <= cfg.tds_high_above {
            reasons.push(AlertReason::ElevatedTds);
        }

        reasons
    }

    /// Display grade for one metric
    pub fn quality_grade(&self, value: f64, metric: Metric) -> QualityGrade {
        let cfg = &self.config;
        match metric {
            Metric::Ph => {
                if self.ph_out_of_range(value) {
                    QualityGrade::NeedsAttention
                } else {
                    QualityGrade::Optimal
                }
            }
            Metric::Tds => {
                if value <= cfg.tds_high_above as f64 {
                    QualityGrade::Excellent
                } else if value <= cfg.tds_good_max as f64 {
                    QualityGrade::Good
                } else {
                    QualityGrade::Poor
                }
            }
            Metric::FilterHealth => {
                if value > cfg.filter_good_above {
                    QualityGrade::Good
                } else if value > cfg.filter_replace_soon_above {
                    QualityGrade::ReplaceSoon
                } else {
                    QualityGrade::ReplaceNow
                }
            }
            Metric::Temperature | Metric::Flow => QualityGrade::Normal,
        }
    }

    /// Classify a reading and attach its reasons
    pub fn assess(&self, reading: DeviceReading, valid: bool) -> ClassifiedDevice {
        ClassifiedDevice {
            alert_level: self.classify_reading(&reading),
            reasons: self.reasons(&reading),
            reading,
            valid,
        }
    }
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

    #[test]
    fn test_ph_thresholds() {
        let c = Classifier::default();
        assert_eq!(c.classify(6.5, Metric::Ph), AlertLevel::Low);
        assert_eq!(c.classify(8.5, Metric::Ph), AlertLevel::Low);
        assert_eq!(c.classify(6.49, Metric::Ph), AlertLevel::High);
        assert_eq!(c.classify(8.51, Metric::Ph), AlertLevel::High);
    }

    #[test]
    fn test_tds_thresholds() {
        let c = Classifier::default();
        assert_eq!(c.classify(250.0, Metric::Tds), AlertLevel::Low);
        assert_eq!(c.classify(251.0, Metric::Tds), AlertLevel::Medium);
        assert_eq!(c.classify(300.0, Metric::Tds), AlertLevel::Medium);
        assert_eq!(c.classify(301.0, Metric::Tds), AlertLevel::High);
    }

    #[test]
    fn test_filter_thresholds() {
        let c = Classifier::default();
        assert_eq!(c.classify(40.0, Metric::FilterHealth), AlertLevel::Low);
        assert_eq!(c.classify(39.9, Metric::FilterHealth), AlertLevel::Medium);
        assert_eq!(c.classify(20.0, Metric::FilterHealth), AlertLevel::Medium);
        assert_eq!(c.classify(19.9, Metric::FilterHealth), AlertLevel::High);
    }

    #[test]
    fn test_unthresholded_metrics_are_low() {
        let c = Classifier::default();
        assert_eq!(c.classify(95.0, Metric::Temperature), AlertLevel::Low);
        assert_eq!(c.classify(0.0, Metric::Flow), AlertLevel::Low);
    }

    #[test]
    fn test_non_finite_is_high() {
        let c = Classifier::default();
        assert_eq!(c.classify(f64::NAN, Metric::Ph), AlertLevel::High);
        assert_eq!(c.classify(f64::INFINITY, Metric::Tds), AlertLevel::High);
        assert_eq!(c.classify(f64::NAN, Metric::FilterHealth), AlertLevel::High);
        assert_eq!(c.classify_reading(&reading(f64::NAN, 200, 50.0)), AlertLevel::High);
    }

    #[test]
    fn test_composite_high_beats_medium() {
        let c = Classifier::default();
        assert_eq!(c.classify_reading(&reading(7.0, 260, 15.0)), AlertLevel::High);
    }

    #[test]
    fn test_composite_scenarios() {
        let c = Classifier::default();
        assert_eq!(c.classify_reading(&reading(7.0, 200, 50.0)), AlertLevel::Low);
        assert_eq!(c.classify_reading(&reading(6.0, 200, 50.0)), AlertLevel::High);
        assert_eq!(c.classify_reading(&reading(7.2, 320, 60.0)), AlertLevel::High);
        assert_eq!(c.classify_reading(&reading(7.2, 270, 60.0)), AlertLevel::Medium);
        assert_eq!(c.classify_reading(&reading(7.2, 200, 30.0)), AlertLevel::Medium);
    }

    #[test]
    fn test_reasons() {
        let c = Classifier::default();
        assert_eq!(
            c.reasons(&reading(9.0, 350, 10.0)),
            vec![
                AlertReason::FilterReplacement,
                AlertReason::PhOutOfRange,
                AlertReason::HighTds
            ]
        );
        assert_eq!(
            c.reasons(&reading(7.0, 280, 30.0)),
            vec![AlertReason::FilterWearing, AlertReason::ElevatedTds]
        );
        assert!(c.reasons(&reading(7.0, 200, 80.0)).is_empty());
    }

    #[test]
    fn test_quality_grades() {
        let c = Classifier::default();
        assert_eq!(c.quality_grade(7.0, Metric::Ph), QualityGrade::Optimal);
        assert_eq!(c.quality_grade(9.0, Metric::Ph), QualityGrade::NeedsAttention);
        assert_eq!(c.quality_grade(300.0, Metric::Tds), QualityGrade::Excellent);
        assert_eq!(c.quality_grade(450.0, Metric::Tds), QualityGrade::Good);
        assert_eq!(c.quality_grade(501.0, Metric::Tds), QualityGrade::Poor);
        assert_eq!(c.quality_grade(21.0, Metric::FilterHealth), QualityGrade::Good);
        assert_eq!(c.quality_grade(20.0, Metric::FilterHealth), QualityGrade::ReplaceSoon);
        assert_eq!(c.quality_grade(10.0, Metric::FilterHealth), QualityGrade::ReplaceNow);
        assert_eq!(c.quality_grade(30.0, Metric::Temperature), QualityGrade::Normal);
    }

    #[test]
    fn test_custom_thresholds() {
        let c = Classifier::new(AlertConfig {
            tds_high_above: 200,
            tds_medium_above: 150,
            ..Default::default()
        });
        assert_eq!(c.classify_reading(&reading(7.0, 210, 80.0)), AlertLevel::High);
        assert_eq!(c.classify_reading(&reading(7.0, 160, 80.0)), AlertLevel::Medium);
    }

    #[test]
    fn test_assess() {
        let c = Classifier::default();
        let device = c.assess(reading(6.0, 200, 50.0), true);
        assert_eq!(device.alert_level, AlertLevel::High);
        assert_eq!(device.reasons, vec![AlertReason::PhOutOfRange]);
        assert!(device.valid);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn ph_branch_isolated(ph in -2.0f64..16.0, tds in 0u32..=250, health in 40.0f64..=100.0) {
                let level = Classifier::default().classify_reading(&reading(ph, tds, health));
                let expect_high = ph < 6.5 || ph > 8.5;
                prop_assert_eq!(level == AlertLevel::High, expect_high);
            }

            #[test]
            fn critical_filter_is_always_high(ph in 6.5f64..=8.5, tds in 0u32..=300, health in 0.0f64..20.0) {
                let level = Classifier::default().classify_reading(&reading(ph, tds, health));
                prop_assert_eq!(level, AlertLevel::High);
            }

            #[test]
            fn worn_filter_is_medium(ph in 6.5f64..=8.5, tds in 0u32..=300, health in 20.0f64..40.0) {
                let level = Classifier::default().classify_reading(&reading(ph, tds, health));
                prop_assert_eq!(level, AlertLevel::Medium);
            }

            #[test]
            fn composite_is_max_of_metric_levels(ph in 5.0f64..10.0, tds in 0u32..500, health in 0.0f64..100.0) {
                let c = Classifier::default();
                let r = reading(ph, tds, health);
                let max = [Metric::Ph, Metric::Tds, Metric::FilterHealth]
                    .iter()
                    .map(|&m| c.classify(r.metric(m), m))
                    .max()
                    .unwrap();
                prop_assert_eq!(c.classify_reading(&r), max);
            }

            #[test]
            fn high_iff_reasons_contain_critical(ph in 5.0f64..10.0, tds in 0u32..500, health in 0.0f64..100.0) {
                let c = Classifier::default();
                let r = reading(ph, tds, health);
                let critical = c.reasons(&r).iter().any(|reason| reason.level() == AlertLevel::High);
                prop_assert_eq!(c.classify_reading(&r) == AlertLevel::High, critical);
            }
        }
    }
}
