//! Fleet Snapshot Pipeline
//!
//! raw readings → normalized readings → displayed fleet → classification →
//! aggregation. One call produces one complete, self-consistent snapshot.

use crate::config::{FleetConfig, FleetMode};
use alerting::{active_alerts, ActiveAlert, ClassifiedDevice, Classifier};
use chrono::{DateTime, Utc};
use data_validator::{NormalizedReading, Normalizer};
use fleet_sim::{device_history, fleet_trend, generated_fleet, jittered_fleet, HistoryPoint, TrendPoint};
use fleet_stats::{aggregate_with, FleetSummary};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use telemetry_types::{DeviceReading, RawReading};
use tracing::{debug, warn};

/// Everything the dashboard shows for one refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct FleetSnapshot {
    pub refreshed_at: DateTime<Utc>,
    pub devices: Vec<ClassifiedDevice>,
    pub summary: FleetSummary,
    pub alerts: Vec<ActiveAlert>,
    pub trend: Vec<TrendPoint>,
    /// Fetched records that needed a fallback or failed a range check
    pub invalid_readings: usize,
    #[serde(skip)]
    pub histories: BTreeMap<String, Vec<HistoryPoint>>,
}

impl FleetSnapshot {
    /// Snapshot with no devices
    pub fn empty(refreshed_at: DateTime<Utc>) -> Self {
        Self {
            refreshed_at,
            devices: Vec::new(),
            summary: FleetSummary::default(),
            alerts: Vec::new(),
            trend: Vec::new(),
            invalid_readings: 0,
            histories: BTreeMap::new(),
        }
    }

    pub fn device(&self, device_id: &str) -> Option<&ClassifiedDevice> {
        self.devices.iter().find(|d| d.reading.device_id == device_id)
    }

    pub fn history(&self, device_id: &str) -> Option<&[HistoryPoint]> {
        self.histories.get(device_id).map(Vec::as_slice)
    }
}

/// Give every repeated device id a `-2`, `-3`, ... suffix
///
/// The first occurrence keeps its id. Records without an id all normalize to
/// the same placeholder, so this keeps lookups and histories one-to-one.
fn dedupe_device_ids(fleet: &mut [(DeviceReading, bool)]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(fleet.len());
    for (reading, _) in fleet.iter_mut() {
        if seen.insert(reading.device_id.clone()) {
            continue;
        }

        let original = reading.device_id.clone();
        let unique = (2..)
            .map(|n| format!("{}-{}", original, n))
            .find(|candidate| !seen.contains(candidate))
            .unwrap_or_else(|| original.clone());
        warn!("Duplicate device id {}, renamed to {}", original, unique);
        seen.insert(unique.clone());
        reading.device_id = unique;
    }
}

/// Stateless snapshot builder
#[derive(Debug, Clone, Default)]
pub struct FleetPipeline {
    normalizer: Normalizer,
    classifier: Classifier,
    fleet: FleetConfig,
}

impl FleetPipeline {
    pub fn new(normalizer: Normalizer, classifier: Classifier, fleet: FleetConfig) -> Self {
        Self {
            normalizer,
            classifier,
            fleet,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Normalize every record, logging the ones that needed a fallback
    fn normalize_all(&self, raw: &[RawReading], now: DateTime<Utc>) -> Vec<NormalizedReading> {
        raw.iter()
            .map(|record| {
                let normalized = self.normalizer.normalize(record, now);
                if !normalized.is_valid() {
                    let issues: Vec<String> = normalized.errors.iter().map(|e| e.to_string()).collect();
                    warn!(
                        "Invalid reading from device {}: {}",
                        normalized.reading.device_id,
                        issues.join("; ")
                    );
                }
                normalized
            })
            .collect()
    }

    /// Expand normalized readings into the displayed fleet with validity flags
    fn expand_fleet<R: Rng + ?Sized>(
        &self,
        normalized: Vec<NormalizedReading>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<(DeviceReading, bool)> {
        match self.fleet.mode {
            FleetMode::Jittered if !self.fleet.profiles.is_empty() => {
                let Some(base) = normalized.first() else {
                    return Vec::new();
                };
                if normalized.len() > 1 {
                    debug!("Jittered fleet uses the first of {} readings", normalized.len());
                }
                let valid = base.is_valid();
                jittered_fleet(&base.reading, &self.fleet.profiles, now, rng)
                    .into_iter()
                    .map(|reading| (reading, valid))
                    .collect()
            }
            FleetMode::Generated => {
                let bases: Vec<DeviceReading> = normalized.into_iter().map(|n| n.reading).collect();
                generated_fleet(&bases, &self.fleet.generated, now, rng)
                    .into_iter()
                    .map(|reading| (reading, true))
                    .collect()
            }
            FleetMode::Jittered | FleetMode::Passthrough => normalized
                .into_iter()
                .map(|n| {
                    let valid = n.is_valid();
                    (n.reading, valid)
                })
                .collect(),
        }
    }

    /// Build a snapshot from one fetched batch
    pub fn build_snapshot<R: Rng + ?Sized>(
        &self,
        raw: &[RawReading],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> FleetSnapshot {
        let normalized = self.normalize_all(raw, now);
        let invalid_readings = normalized.iter().filter(|n| !n.is_valid()).count();

        let mut fleet = self.expand_fleet(normalized, now, rng);
        dedupe_device_ids(&mut fleet);
        let readings: Vec<DeviceReading> = fleet.iter().map(|(r, _)| r.clone()).collect();
        let summary = aggregate_with(&readings, &self.classifier);

        let devices: Vec<ClassifiedDevice> = fleet
            .into_iter()
            .map(|(reading, valid)| self.classifier.assess(reading, valid))
            .collect();
        let alerts = active_alerts(&devices);
        let trend = fleet_trend(&summary, rng);
        let histories = devices
            .iter()
            .map(|d| (d.reading.device_id.clone(), device_history(&d.reading, rng)))
            .collect();

        debug!(
            "Built snapshot: {} devices, {} active alert(s), {} invalid reading(s)",
            devices.len(),
            alerts.len(),
            invalid_readings
        );

        FleetSnapshot {
            refreshed_at: now,
            devices,
            summary,
            alerts,
            trend,
            invalid_readings,
            histories,
        }
    }
}
