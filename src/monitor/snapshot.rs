use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::posture::PostureStatus;

/// What alerting and presentation collaborators see after every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureSnapshot {
    pub session_id: Option<String>,
    pub status: PostureStatus,
    pub angle: Option<f64>,
    /// Raw per-frame threshold decision
    pub slouching: bool,
    /// Latched decision after hysteresis and sustain; drives the alert cycle
    pub alerting: bool,
    pub calibrated: bool,
    pub frames: u64,
    pub updated_at: DateTime<Utc>,
}

impl PostureSnapshot {
    pub fn idle() -> Self {
        Self {
            session_id: None,
            status: PostureStatus::Detecting,
            angle: None,
            slouching: false,
            alerting: false,
            calibrated: false,
            frames: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn display_text(&self) -> String {
        match self.angle {
            Some(angle) => format!("Live Angle: {angle:.1}°"),
            None => "Detecting…".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    pub frames: u64,
    pub slouching_frames: u64,
    pub alerts_raised: u64,
}
