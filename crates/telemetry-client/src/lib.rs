//! Telemetry Client
//!
//! Fetches purifier telemetry, turns it into a classified fleet snapshot,
//! and refreshes that snapshot on a fixed interval or on demand.

mod config;
mod error;
mod pipeline;
mod poller;
mod source;
mod store;

pub use config::{FleetConfig, FleetMode, TelemetryConfig};
pub use error::FetchError;
pub use pipeline::{FleetPipeline, FleetSnapshot};
pub use poller::{RefreshHandle, TelemetryPoller};
pub use source::{decode_payload, HttpSource, StaticSource, TelemetrySource};
pub use store::{LoadState, RefreshFailure, SnapshotStore};
