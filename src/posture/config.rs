use serde::{Deserialize, Serialize};

/// Tunable thresholds for classification and the capture cadence.
/// Read at session start; changes apply to the next session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostureConfig {
    /// Deviation at or above which a frame counts as slouching
    pub threshold_degrees: f64,

    /// Recovery margin: a latched slouch clears at `threshold - hysteresis`
    pub hysteresis_degrees: f64,

    /// Reserved for a head-roll signal; not read by the classifier
    pub head_tilt_roll_degrees: f64,

    /// How long the deviation must stay above threshold before alerting
    pub sustain_ms: u64,

    pub frame_interval_ms: u64,
    pub capture_timeout_ms: u64,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            threshold_degrees: 12.0,
            hysteresis_degrees: 2.0,
            head_tilt_roll_degrees: 5.0,
            sustain_ms: 0,
            frame_interval_ms: 2000,
            capture_timeout_ms: 5000,
        }
    }
}

impl PostureConfig {
    pub fn recovery_degrees(&self) -> f64 {
        self.threshold_degrees - self.hysteresis_degrees.max(0.0)
    }
}
