//! Fleet Statistics
//!
//! Aggregates a set of device readings into fleet-wide averages, totals and
//! per-category counts, and summarizes maintenance service calls.

mod maintenance;
mod summary;

pub use maintenance::{maintenance_summary, MaintenanceSummary};
pub use summary::{aggregate, aggregate_with, FleetSummary};
