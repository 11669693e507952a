use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Vector;
use crate::pose::{Point, PoseLandmarks, Side};

/// Reference geometry for one side, frozen at calibration time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideBaseline {
    /// Eye position when calibrated. Not used for classification.
    pub base: Point,
    /// Eye → shoulder vector when calibrated.
    pub vec: Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub left: Option<SideBaseline>,
    pub right: Option<SideBaseline>,
    pub captured_at: DateTime<Utc>,
}

impl Baseline {
    /// Derives both sides from `pose`. A side whose eye or shoulder is
    /// missing is `None`.
    pub fn from_pose(pose: &PoseLandmarks, captured_at: DateTime<Utc>) -> Self {
        let side = |side: Side| {
            Some(SideBaseline {
                base: pose.eye(side)?,
                vec: pose.eye_shoulder_vector(side)?,
            })
        };

        Self {
            left: side(Side::Left),
            right: side(Side::Right),
            captured_at,
        }
    }

    pub fn side(&self, side: Side) -> Option<&SideBaseline> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    pub fn valid_sides(&self) -> usize {
        Side::BOTH.iter().filter(|s| self.side(**s).is_some()).count()
    }
}

/// Latest pose snapshot plus the calibrated baseline for one monitoring
/// session. Nothing is persisted; a new session starts uncalibrated.
#[derive(Debug, Clone, Default)]
pub struct BaselineStore {
    last_pose: Option<PoseLandmarks>,
    baseline: Option<Baseline>,
}

impl BaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the latest snapshot. No validation or rate limiting; the
    /// producer owns the cadence.
    pub fn record_pose(&mut self, landmarks: PoseLandmarks) {
        self.last_pose = Some(landmarks);
    }

    /// Freezes the latest snapshot into a new baseline, replacing both sides
    /// at once. Returns `false` and leaves any existing baseline untouched
    /// when no pose has been recorded.
    pub fn calibrate(&mut self) -> bool {
        self.calibrate_at(Utc::now())
    }

    pub fn calibrate_at(&mut self, now: DateTime<Utc>) -> bool {
        let Some(pose) = self.last_pose.as_ref() else {
            return false;
        };
        self.baseline = Some(Baseline::from_pose(pose, now));
        true
    }

    pub fn last_pose(&self) -> Option<&PoseLandmarks> {
        self.last_pose.as_ref()
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
