//! Raw Telemetry Normalization
//!
//! Parses the text fields of a `RawReading` into a `DeviceReading`.
//! A missing or unparsable numeric field falls back to zero, records a
//! `ValidationError` and flags the reading invalid; normalization itself
//! never fails.

use crate::error::ValidationError;
use crate::validator::{ValidationConfig, Validator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use telemetry_types::{DeviceReading, DeviceStatus, FilterType, RawReading};
use tracing::debug;

/// Device id used when the record carries none
pub const UNKNOWN_DEVICE_ID: &str = "unknown";

/// Outcome of normalizing one raw record
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedReading {
    pub reading: DeviceReading,
    /// Everything that went wrong, in field order
    pub errors: Vec<ValidationError>,
}

impl NormalizedReading {
    /// True when every field parsed and passed its range check
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Normalizer from wire records to device readings
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    validator: Validator,
}

impl Normalizer {
    /// Create a normalizer with the given range configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            validator: Validator::new(config),
        }
    }

    /// Normalize a raw record
    ///
    /// `received_at` stands in for the timestamp when the record carries
    /// none or an unparsable one.
    pub fn normalize(&self, raw: &RawReading, received_at: DateTime<Utc>) -> NormalizedReading {
        let mut errors = Vec::new();

        let device_id = match raw.device_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                errors.push(ValidationError::MissingField { field: "device_id" });
                UNKNOWN_DEVICE_ID.to_string()
            }
        };

        let tds = parse_count("tds", raw.tds.as_deref(), &mut errors);
        let flow = parse_decimal("flow", raw.flow.as_deref(), &mut errors);
        let temperature = parse_decimal("temperature", raw.temperature.as_deref(), &mut errors);
        let ph = parse_decimal("ph", raw.ph.as_deref(), &mut errors);
        let filter_health = parse_decimal("filter_health", raw.filter_health.as_deref(), &mut errors);

        let filter_type = match raw.filter_type.as_deref() {
            Some(text) => text.parse::<FilterType>().unwrap_or_else(|_| {
                errors.push(ValidationError::InvalidFormat {
                    field: "filter_type",
                    value: text.to_string(),
                });
                FilterType::default()
            }),
            None => {
                errors.push(ValidationError::MissingField { field: "filter_type" });
                FilterType::default()
            }
        };

        let timestamp = match raw.timestamp.as_deref() {
            Some(text) => parse_timestamp(text).unwrap_or_else(|| {
                errors.push(ValidationError::InvalidFormat {
                    field: "timestamp",
                    value: text.to_string(),
                });
                received_at
            }),
            None => {
                errors.push(ValidationError::MissingField { field: "timestamp" });
                received_at
            }
        };

        let reading = DeviceReading {
            device_id,
            ph,
            tds,
            temperature,
            flow,
            filter_health,
            filter_type,
            timestamp,
            status: DeviceStatus::Online,
            location: None,
        };

        // Only range-check what actually parsed; fallbacks already carry an error
        let parse_failed: Vec<&'static str> = errors.iter().map(|e| e.field()).collect();
        errors.extend(
            self.validator
                .validate_reading(&reading)
                .errors
                .into_iter()
                .filter(|e| !parse_failed.contains(&e.field())),
        );

        if !errors.is_empty() {
            debug!(
                "Reading from device {} has {} issue(s)",
                reading.device_id,
                errors.len()
            );
        }

        NormalizedReading { reading, errors }
    }
}

/// Parse a decimal field, rejecting non-finite values
fn parse_decimal(field: &'static str, text: Option<&str>, errors: &mut Vec<ValidationError>) -> f64 {
    let Some(text) = text else {
        errors.push(ValidationError::MissingField { field });
        return 0.0;
    };

    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            errors.push(ValidationError::InvalidFormat {
                field,
                value: text.to_string(),
            });
            0.0
        }
    }
}

/// Parse an integer count; decimal text truncates toward zero
fn parse_count(field: &'static str, text: Option<&str>, errors: &mut Vec<ValidationError>) -> u32 {
    let Some(text) = text else {
        errors.push(ValidationError::MissingField { field });
        return 0;
    };

    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<u32>() {
        return value;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.trunc() >= 0.0 && value <= u32::MAX as f64 => {
            value.trunc() as u32
        }
        Ok(value) if value.is_finite() && value < 0.0 => {
            errors.push(ValidationError::OutOfRange {
                field,
                value,
                min: 0.0,
                max: u32::MAX as f64,
            });
            0
        }
        _ => {
            errors.push(ValidationError::InvalidFormat {
                field,
                value: text.to_string(),
            });
            0
        }
    }
}

/// RFC 3339 first, then a bare `YYYY-MM-DD HH:MM:SS` taken as UTC
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn wire_reading() -> RawReading {
        RawReading {
            device_id: Some("223".to_string()),
            tds: Some("215".to_string()),
            flow: Some("2.4".to_string()),
            temperature: Some("27.5".to_string()),
            ph: Some("7.12".to_string()),
            filter_health: Some("64.0".to_string()),
            filter_type: Some("RO".to_string()),
            timestamp: Some("2024-05-01T10:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_normalize_well_formed() {
        let result = Normalizer::default().normalize(&wire_reading(), received_at());
        assert!(result.is_valid(), "{:?}", result.errors);

        let reading = result.reading;
        assert_eq!(reading.device_id, "223");
        assert_eq!(reading.tds, 215);
        assert!((reading.flow - 2.4).abs() < 1e-9);
        assert!((reading.temperature - 27.5).abs() < 1e-9);
        assert!((reading.ph - 7.12).abs() < 1e-9);
        assert!((reading.filter_health - 64.0).abs() < 1e-9);
        assert_eq!(reading.filter_type, FilterType::Ro);
        assert_eq!(reading.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        assert_eq!(reading.status, DeviceStatus::Online);
    }

    #[test]
    fn test_unparsable_field_falls_back_to_zero() {
        let raw = RawReading {
            ph: Some("seven".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert!(!result.is_valid());
        assert_eq!(result.reading.ph, 0.0);
        assert_eq!(
            result.errors,
            vec![ValidationError::InvalidFormat {
                field: "ph",
                value: "seven".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let raw = RawReading {
            device_id: Some("9".to_string()),
            ..Default::default()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert_eq!(result.errors.len(), 7);
        assert_eq!(result.reading.timestamp, received_at());
        assert_eq!(result.reading.tds, 0);
        assert_eq!(result.reading.filter_type, FilterType::Ro);
    }

    #[test]
    fn test_tds_decimal_truncates() {
        let raw = RawReading {
            tds: Some("250.9".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert!(result.is_valid());
        assert_eq!(result.reading.tds, 250);
    }

    #[test]
    fn test_negative_tds_is_flagged() {
        let raw = RawReading {
            tds: Some("-12".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert_eq!(result.reading.tds, 0);
        assert!(matches!(
            result.errors.as_slice(),
            [ValidationError::OutOfRange { field: "tds", .. }]
        ));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let raw = RawReading {
            flow: Some("NaN".to_string()),
            temperature: Some("inf".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert_eq!(result.reading.flow, 0.0);
        assert_eq!(result.reading.temperature, 0.0);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_noisy_ph_is_kept_but_flagged() {
        let raw = RawReading {
            ph: Some("14.3".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert!((result.reading.ph - 14.3).abs() < 1e-9);
        assert!(matches!(
            result.errors.as_slice(),
            [ValidationError::OutOfRange { field: "ph", .. }]
        ));
    }

    #[test]
    fn test_bad_filter_type_and_timestamp() {
        let raw = RawReading {
            filter_type: Some("carbon".to_string()),
            timestamp: Some("yesterday".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert_eq!(result.reading.filter_type, FilterType::Ro);
        assert_eq!(result.reading.timestamp, received_at());
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_space_separated_timestamp() {
        let raw = RawReading {
            timestamp: Some("2024-05-01 08:30:00".to_string()),
            ..wire_reading()
        };
        let result = Normalizer::default().normalize(&raw, received_at());
        assert!(result.is_valid());
        assert_eq!(
            result.reading.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_never_panics(
                ph in ".{0,8}",
                tds in ".{0,8}",
                flow in ".{0,8}",
            ) {
                let raw = RawReading {
                    ph: Some(ph),
                    tds: Some(tds),
                    flow: Some(flow),
                    ..wire_reading()
                };
                let result = Normalizer::default().normalize(&raw, received_at());
                prop_assert!(result.reading.ph.is_finite());
                prop_assert!(result.reading.flow.is_finite());
            }

            #[test]
            fn in_range_decimals_round_trip(ph in 0.0f64..14.0, health in 0.0f64..100.0) {
                let raw = RawReading {
                    ph: Some(format!("{ph}")),
                    filter_health: Some(format!("{health}")),
                    ..wire_reading()
                };
                let result = Normalizer::default().normalize(&raw, received_at());
                prop_assert!(result.is_valid());
                prop_assert_eq!(result.reading.ph, ph);
                prop_assert_eq!(result.reading.filter_health, health);
            }
        }
    }
}
