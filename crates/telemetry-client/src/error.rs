//! Telemetry Fetch Error Types

use thiserror::Error;

/// Errors that can occur while fetching telemetry
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status
    #[error("Telemetry endpoint returned status {0}")]
    Status(u16),

    /// Body was not a reading or list of readings
    #[error("Invalid telemetry payload: {0}")]
    Decode(String),

    /// Payload decoded but held no readings
    #[error("Telemetry payload contained no readings")]
    Empty,

    /// Timeout waiting for response
    #[error("Timeout waiting for telemetry after {0}ms")]
    Timeout(u64),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
