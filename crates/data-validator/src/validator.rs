//! Data Validator for Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use telemetry_types::{DeviceReading, Metric};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// pH valid range
    pub ph_range: (f64, f64),
    /// TDS valid range (ppm)
    pub tds_range: (f64, f64),
    /// Water temperature valid range (°C)
    pub temperature_range: (f64, f64),
    /// Flow valid range (L/min)
    pub flow_range: (f64, f64),
    /// Filter health valid range (%)
    pub filter_health_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ph_range: (0.0, 14.0),
            tds_range: (0.0, 5000.0),
            temperature_range: (0.0, 100.0),
            flow_range: (0.0, 50.0),
            filter_health_range: (0.0, 100.0),
        }
    }
}

impl ValidationConfig {
    /// Range configured for a metric
    pub fn range(&self, metric: Metric) -> (f64, f64) {
        match metric {
            Metric::Ph => self.ph_range,
            Metric::Tds => self.tds_range,
            Metric::Temperature => self.temperature_range,
            Metric::Flow => self.flow_range,
            Metric::FilterHealth => self.filter_health_range,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Range validator for purifier readings
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    const CHECKED_METRICS: [Metric; 5] = [
        Metric::Ph,
        Metric::Tds,
        Metric::Temperature,
        Metric::Flow,
        Metric::FilterHealth,
    ];

    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        // NaN fails both comparisons, so test for containment instead
        if value >= range.0 && value <= range.1 {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        }
    }

    /// Validate one metric against its configured range
    pub fn validate_metric(&self, metric: Metric, value: f64) -> Result<(), ValidationError> {
        self.validate_range(metric.field_name(), value, self.config.range(metric))
    }

    /// Validate pH
    pub fn validate_ph(&self, ph: f64) -> Result<(), ValidationError> {
        self.validate_metric(Metric::Ph, ph)
    }

    /// Validate filter health
    pub fn validate_filter_health(&self, health: f64) -> Result<(), ValidationError> {
        self.validate_metric(Metric::FilterHealth, health)
    }

    /// Range-check every metric of a reading
    pub fn validate_reading(&self, reading: &DeviceReading) -> ValidationResult {
        let errors: Vec<ValidationError> = Self::CHECKED_METRICS
            .iter()
            .filter_map(|&metric| self.validate_metric(metric, reading.metric(metric)).err())
            .collect();

        if errors.is_empty() {
            ValidationResult::valid(Self::CHECKED_METRICS.len())
        } else {
            ValidationResult::invalid(errors, Self::CHECKED_METRICS.len())
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
