//! Data Validation and Normalization
//!
//! Turns text-encoded telemetry records into numeric device readings and
//! range-checks the result. Malformed fields never abort normalization:
//! they fall back to zero and the reading is flagged invalid.

mod error;
mod normalizer;
mod validator;

pub use error::ValidationError;
pub use normalizer::{NormalizedReading, Normalizer};
pub use validator::{ValidationConfig, ValidationResult, Validator};
