#[cfg(feature = "audio")]
pub mod chime;
#[cfg(feature = "audio")]
pub mod engine;
pub mod scheduler;

#[cfg(feature = "audio")]
pub use engine::ChimeSink;
pub use scheduler::AlertScheduler;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertConfig {
    pub enabled: bool,
    /// Length of one chime; the next one starts a further `chime_gap_extra_ms` later
    pub chime_duration_ms: u64,
    pub chime_gap_extra_ms: u64,
    pub haptics: bool,
    pub pulse_interval_ms: u64,
    pub volume: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chime_duration_ms: 1000,
            chime_gap_extra_ms: 1000,
            haptics: true,
            pulse_interval_ms: 5000,
            volume: 1.0,
        }
    }
}

impl AlertConfig {
    pub fn chime_gap(&self) -> Duration {
        Duration::from_millis(self.chime_duration_ms + self.chime_gap_extra_ms)
    }

    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_interval_ms.max(1))
    }
}

/// Output side of an alert: something audible and something tactile.
pub trait AlertSink: Send + Sync {
    fn chime(&self);

    fn pulse(&self);

    /// The alert cycle ended. A chime already playing may finish.
    fn cleared(&self) {}
}

/// Sink for hosts without audio or haptics; every alert becomes a log line.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn chime(&self) {
        warn!("Posture alert: slouching detected");
    }

    fn pulse(&self) {
        info!("Posture alert: haptic pulse");
    }

    fn cleared(&self) {
        info!("Posture alert cleared");
    }
}
