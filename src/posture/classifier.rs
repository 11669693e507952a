use serde::{Deserialize, Serialize};

use crate::baseline::{Baseline, BaselineStore};
use crate::geometry::angle_between;
use crate::pose::{PoseLandmarks, Side};

use super::config::PostureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Deviation {
    /// Mean deviation in degrees across sides valid in both the baseline
    /// and the live frame. `None` while there is nothing to compare.
    pub angle: Option<f64>,
    pub slouching: bool,
}

impl Deviation {
    pub const UNKNOWN: Deviation = Deviation {
        angle: None,
        slouching: false,
    };
}

/// Deviation for a single side, or `None` when either the baseline entry
/// or the live eye/shoulder pair is missing.
fn side_angle(baseline: &Baseline, pose: &PoseLandmarks, side: Side) -> Option<f64> {
    let reference = baseline.side(side)?;
    let live = pose.eye_shoulder_vector(side)?;
    Some(angle_between(reference.vec, live))
}

/// Compares `pose` against `baseline`.
///
/// Stateless: the raw threshold is applied to every call. Hysteresis across
/// frames lives in [`super::PostureTracker`].
pub fn classify(
    baseline: Option<&Baseline>,
    pose: Option<&PoseLandmarks>,
    config: &PostureConfig,
) -> Deviation {
    let (Some(baseline), Some(pose)) = (baseline, pose) else {
        return Deviation::UNKNOWN;
    };

    let angles: Vec<f64> = Side::BOTH
        .iter()
        .filter_map(|side| side_angle(baseline, pose, *side))
        .collect();

    if angles.is_empty() {
        return Deviation::UNKNOWN;
    }

    let angle = angles.iter().sum::<f64>() / angles.len() as f64;
    Deviation {
        angle: Some(angle),
        slouching: angle >= config.threshold_degrees,
    }
}

pub fn compute(store: &BaselineStore, config: &PostureConfig) -> Deviation {
    classify(store.baseline(), store.last_pose(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::pose::Point;

    const UPRIGHT: Vector = Vector::new(0.0, -100.0);

    fn eye(side: Side) -> Point {
        match side {
            Side::Left => Point::new(100.0, 300.0),
            Side::Right => Point::new(200.0, 300.0),
        }
    }

    /// Pose whose eye→shoulder vector on each listed side is `UPRIGHT`
    /// rotated by the given number of degrees.
    fn pose_with(left: Option<f64>, right: Option<f64>) -> PoseLandmarks {
        let place = |side: Side, degrees: Option<f64>| {
            degrees.map(|d| {
                let e = eye(side);
                let v = UPRIGHT.rotated(d);
                (e, Point::new(e.x + v.x, e.y + v.y))
            })
        };
        let l = place(Side::Left, left);
        let r = place(Side::Right, right);
        PoseLandmarks {
            left_eye: l.map(|p| p.0),
            left_shoulder: l.map(|p| p.1),
            right_eye: r.map(|p| p.0),
            right_shoulder: r.map(|p| p.1),
            nose: None,
        }
    }

    fn calibrated(pose: PoseLandmarks) -> BaselineStore {
        let mut store = BaselineStore::new();
        store.record_pose(pose);
        assert!(store.calibrate());
        store
    }

    fn assert_angle(deviation: Deviation, expected: f64) {
        let angle = deviation.angle.expect("angle should be present");
        assert!((angle - expected).abs() < 0.01, "{angle} != {expected}");
    }

    #[test]
    fn test_missing_baseline_or_pose_is_unknown() {
        let config = PostureConfig::default();
        let mut store = BaselineStore::new();
        assert_eq!(compute(&store, &config), Deviation::UNKNOWN);

        store.record_pose(pose_with(Some(30.0), Some(30.0)));
        assert_eq!(compute(&store, &config), Deviation::UNKNOWN);

        let baseline = Baseline::from_pose(&pose_with(Some(0.0), None), chrono::Utc::now());
        assert_eq!(classify(Some(&baseline), None, &config), Deviation::UNKNOWN);
    }

    #[test]
    fn test_identical_pose_is_upright() {
        let mut store = calibrated(pose_with(Some(0.0), Some(0.0)));
        store.record_pose(pose_with(Some(0.0), Some(0.0)));

        let deviation = compute(&store, &PostureConfig::default());
        assert_angle(deviation, 0.0);
        assert!(!deviation.slouching);
    }

    #[test]
    fn test_fifteen_degree_rotation_is_slouching() {
        let mut store = calibrated(pose_with(Some(0.0), None));
        store.record_pose(pose_with(Some(15.0), None));

        let deviation = compute(&store, &PostureConfig::default());
        assert_angle(deviation, 15.0);
        assert!(deviation.slouching);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut store = calibrated(pose_with(Some(0.0), None));
        store.record_pose(pose_with(Some(15.0), None));

        let angle = compute(&store, &PostureConfig::default()).angle.unwrap();

        // Threshold equal to the measured angle, bit for bit.
        let at = PostureConfig {
            threshold_degrees: angle,
            ..Default::default()
        };
        assert!(compute(&store, &at).slouching);

        // The next representable value above it.
        let above = PostureConfig {
            threshold_degrees: f64::from_bits(angle.to_bits() + 1),
            ..Default::default()
        };
        assert!(!compute(&store, &above).slouching);
    }

    #[test]
    fn test_both_sides_are_averaged() {
        let mut store = calibrated(pose_with(Some(0.0), Some(0.0)));
        store.record_pose(pose_with(Some(20.0), Some(0.0)));

        let deviation = compute(&store, &PostureConfig::default());
        assert_angle(deviation, 10.0);
        assert!(!deviation.slouching);
    }

    #[test]
    fn test_missing_live_side_is_skipped() {
        let mut store = calibrated(pose_with(Some(0.0), Some(0.0)));
        store.record_pose(pose_with(None, Some(20.0)));

        let deviation = compute(&store, &PostureConfig::default());
        assert_angle(deviation, 20.0);
        assert!(deviation.slouching);
    }

    #[test]
    fn test_no_overlapping_sides_is_unknown() {
        let mut store = calibrated(pose_with(Some(0.0), None));
        store.record_pose(pose_with(None, Some(25.0)));
        assert_eq!(compute(&store, &PostureConfig::default()), Deviation::UNKNOWN);

        let mut store = calibrated(PoseLandmarks::default());
        store.record_pose(pose_with(Some(25.0), Some(25.0)));
        assert_eq!(compute(&store, &PostureConfig::default()), Deviation::UNKNOWN);
    }

    #[test]
    fn test_collapsed_live_vector_counts_as_ninety() {
        let mut store = calibrated(pose_with(Some(0.0), None));
        let e = eye(Side::Left);
        store.record_pose(PoseLandmarks {
            left_eye: Some(e),
            left_shoulder: Some(e),
            ..Default::default()
        });

        let deviation = compute(&store, &PostureConfig::default());
        assert_angle(deviation, 90.0);
        assert!(deviation.slouching);
    }
}
