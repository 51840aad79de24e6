//! Synthesized 24-Hour Series

use crate::{jitter, round_to};
use fleet_stats::FleetSummary;
use rand::Rng;
use serde::{Deserialize, Serialize};
use telemetry_types::DeviceReading;

/// Points per series, one per hour
pub const HISTORY_HOURS: usize = 24;

/// One hour of a single device's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Hour label, newest first ("23:00" down to "0:00")
    pub time: String,
    pub ph: f64,
    pub tds: u32,
    pub temperature: f64,
    pub flow: f64,
    pub filter_health: f64,
}

/// One hour of the fleet trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: String,
    pub avg_ph: f64,
    pub avg_tds: u32,
    pub total_flow: f64,
}

fn hour_label(index: usize) -> String {
    format!("{}:00", HISTORY_HOURS - 1 - index)
}

/// Hourly history jittered around the current reading
pub fn device_history<R: Rng + ?Sized>(reading: &DeviceReading, rng: &mut R) -> Vec<HistoryPoint> {
    (0..HISTORY_HOURS)
        .map(|i| HistoryPoint {
            time: hour_label(i),
            ph: round_to(reading.ph + jitter(rng, 0.25), 2),
            tds: (reading.tds as f64 + jitter(rng, 25.0)).floor().max(0.0) as u32,
            temperature: round_to(reading.temperature + jitter(rng, 1.5), 1),
            flow: round_to((reading.flow + jitter(rng, 0.5)).max(0.0), 2),
            filter_health: round_to((reading.filter_health + jitter(rng, 5.0)).clamp(0.0, 100.0), 1),
        })
        .collect()
}

/// Hourly fleet trend jittered around the current summary
///
/// An empty fleet has no trend.
pub fn fleet_trend<R: Rng + ?Sized>(summary: &FleetSummary, rng: &mut R) -> Vec<TrendPoint> {
    if summary.device_count == 0 {
        return Vec::new();
    }

    (0..HISTORY_HOURS)
        .map(|i| TrendPoint {
            time: hour_label(i),
            avg_ph: round_to(summary.avg_ph + jitter(rng, 0.15), 2),
            avg_tds: (summary.avg_tds + jitter(rng, 15.0)).floor().max(0.0) as u32,
            total_flow: round_to((summary.total_flow + jitter(rng, 2.5)).max(0.0), 2),
        })
        .collect()
}
