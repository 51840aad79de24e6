//! Mock Fleet Synthesis
//!
//! The telemetry endpoint reports a single purifier. The dashboards show a
//! fleet, so sibling devices and hourly trend series are synthesized around
//! the real reading. Every function takes the random source as a parameter;
//! seed it for reproducible output.

mod history;
mod profile;
mod synth;

pub use history::{device_history, fleet_trend, HistoryPoint, TrendPoint, HISTORY_HOURS};
pub use profile::{default_profiles, DeviceProfile};
pub use synth::{generated_fleet, jittered_fleet, GeneratedFleetConfig};

/// Round to a fixed number of decimal places, as the dashboards display
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Uniform offset in `[-span, span)`; zero span yields zero
pub(crate) fn jitter<R: rand::Rng + ?Sized>(rng: &mut R, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    rng.gen::<f64>() * 2.0 * span - span
}
