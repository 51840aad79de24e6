//! Fleet Synthesis Around a Real Reading

use crate::profile::DeviceProfile;
use crate::{jitter, round_to};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use telemetry_types::{DeviceReading, DeviceStatus};
use tracing::debug;

/// Parameters of a uniformly generated fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedFleetConfig {
    /// Number of devices
    pub count: usize,
    /// Numeric id of the first device; the rest count up from it
    pub first_id: u32,
    pub tds_range: (u32, u32),
    pub flow_range: (f64, f64),
    pub temperature_range: (f64, f64),
    pub ph_range: (f64, f64),
    pub filter_health_range: (f64, f64),
}

impl Default for GeneratedFleetConfig {
    fn default() -> Self {
        Self {
            count: 40,
            first_id: 220,
            tds_range: (150, 350),
            flow_range: (0.5, 4.5),
            temperature_range: (25.0, 45.0),
            ph_range: (6.5, 8.5),
            filter_health_range: (50.0, 80.0),
        }
    }
}

/// Uniform in `[lo, hi)`, collapsing to `lo` for an empty range
fn uniform<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi <= lo {
        return lo;
    }
    lo + rng.gen::<f64>() * (hi - lo)
}

/// Whole-number offset drawn uniformly from an inclusive range
///
/// An empty or single-value range yields its smaller bound.
fn tds_offset<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (i32, i32)) -> f64 {
    if hi <= lo {
        return lo.min(hi) as f64;
    }
    rng.gen_range(lo..=hi) as f64
}

/// Apply each profile to the real reading
///
/// Output order follows `profiles`. Flow and TDS are kept non-negative and
/// filter health within 0-100 %.
pub fn jittered_fleet<R: Rng + ?Sized>(
    base: &DeviceReading,
    profiles: &[DeviceProfile],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DeviceReading> {
    profiles
        .iter()
        .map(|profile| {
            let passthrough = profile.device_id.is_none();
            let tds_shift = tds_offset(rng, profile.tds_offset);
            let flow = base.flow + jitter(rng, profile.flow_span);
            let temperature = base.temperature + jitter(rng, profile.temperature_span);
            let ph = base.ph + jitter(rng, profile.ph_span);
            let filter_health = base.filter_health + rng.gen::<f64>() * profile.filter_boost.max(0.0);

            if passthrough {
                return DeviceReading {
                    location: Some(profile.location.clone()),
                    status: profile.status,
                    filter_type: profile.filter_type.unwrap_or(base.filter_type),
                    ..base.clone()
                };
            }

            DeviceReading {
                device_id: profile.device_id.clone().unwrap_or_else(|| base.device_id.clone()),
                ph: round_to(ph, 2),
                tds: (base.tds as f64 + tds_shift).max(0.0) as u32,
                temperature: round_to(temperature, 1),
                flow: round_to(flow.max(0.0), 1),
                filter_health: round_to(filter_health.clamp(0.0, 100.0), 1),
                filter_type: profile.filter_type.unwrap_or(base.filter_type),
                timestamp: now,
                status: profile.status,
                location: Some(profile.location.clone()),
            }
        })
        .collect()
}

/// Generate `config.count` devices with uniformly drawn metrics
///
/// Filter type is taken from the base readings in rotation.
pub fn generated_fleet<R: Rng + ?Sized>(
    bases: &[DeviceReading],
    config: &GeneratedFleetConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DeviceReading> {
    if bases.is_empty() {
        return Vec::new();
    }

    let (tds_lo, tds_hi) = config.tds_range;
    let devices: Vec<DeviceReading> = (0..config.count)
        .map(|i| {
            let base = &bases[i % bases.len()];
            let tds = if tds_hi > tds_lo {
                rng.gen_range(tds_lo..tds_hi)
            } else {
                tds_lo
            };
            DeviceReading {
                device_id: (config.first_id as u64 + i as u64).to_string(),
                ph: round_to(uniform(rng, config.ph_range), 1),
                tds,
                temperature: round_to(uniform(rng, config.temperature_range), 1),
                flow: round_to(uniform(rng, config.flow_range), 1),
                filter_health: round_to(uniform(rng, config.filter_health_range), 1),
                filter_type: base.filter_type,
                timestamp: now,
                status: DeviceStatus::Online,
                location: base.location.clone(),
            }
        })
        .collect();

    debug!("Generated fleet of {} devices", devices.len());
    devices
}
