//! Alerting System
//!
//! Maps purifier metrics to alert levels with fixed thresholds, derives the
//! composite per-device level, and lists the reasons a device needs
//! attention.

mod classifier;
mod level;
mod reason;

pub use classifier::{AlertConfig, ClassifiedDevice, Classifier};
pub use level::{AlertLevel, QualityGrade};
pub use reason::{active_alerts, ActiveAlert, AlertReason};
