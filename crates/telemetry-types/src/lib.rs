//! Purifier Telemetry Types
//!
//! Shared data model for the fleet telemetry pipeline: the text-encoded
//! wire record, the normalized device reading, maintenance service calls,
//! and the enums describing device hardware and connectivity.

mod device;
mod maintenance;
mod reading;

pub use device::{DeviceStatus, FilterType, Metric, ParseEnumError};
pub use maintenance::{CallPriority, CallStatus, MaintenanceCall};
pub use reading::{DeviceReading, RawReading};
