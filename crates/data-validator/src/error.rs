//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// Problems found while normalizing or range-checking a reading
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Field present but not parseable
    #[error("{field} has invalid value {value:?}")]
    InvalidFormat { field: &'static str, value: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. } => field,
            ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::MissingField { field } => field,
        }
    }
}
