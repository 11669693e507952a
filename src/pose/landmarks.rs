use serde::{Deserialize, Serialize};
use std::ops::Sub;

use crate::geometry::Vector;

/// A landmark position in image-pixel space. Noisy detections may land
/// outside the frame, so negative coordinates are valid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// Named landmarks from one detection cycle. Any subset may be missing when
/// the detector could not resolve it in that frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseLandmarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_shoulder: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_shoulder: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nose: Option<Point>,
}

impl PoseLandmarks {
    pub fn eye(&self, side: Side) -> Option<Point> {
        match side {
            Side::Left => self.left_eye,
            Side::Right => self.right_eye,
        }
    }

    pub fn shoulder(&self, side: Side) -> Option<Point> {
        match side {
            Side::Left => self.left_shoulder,
            Side::Right => self.right_shoulder,
        }
    }

    /// `shoulder - eye` for `side`, when both landmarks are present.
    pub fn eye_shoulder_vector(&self, side: Side) -> Option<Vector> {
        Some(self.shoulder(side)? - self.eye(side)?)
    }

    pub fn is_empty(&self) -> bool {
        self.left_eye.is_none()
            && self.right_eye.is_none()
            && self.left_shoulder.is_none()
            && self.right_shoulder.is_none()
            && self.nose.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_shoulder_vector_requires_both_points() {
        let pose = PoseLandmarks {
            left_eye: Some(Point::new(100.0, 100.0)),
            left_shoulder: Some(Point::new(90.0, 220.0)),
            right_eye: Some(Point::new(200.0, 100.0)),
            ..Default::default()
        };

        assert_eq!(
            pose.eye_shoulder_vector(Side::Left),
            Some(Vector::new(-10.0, 120.0))
        );
        assert_eq!(pose.eye_shoulder_vector(Side::Right), None);
    }

    #[test]
    fn test_deserialize_partial_detector_payload() {
        let json = r#"{"rightEye":{"x":200,"y":100},"rightShoulder":{"x":250,"y":250}}"#;
        let pose: PoseLandmarks = serde_json::from_str(json).unwrap();

        assert_eq!(pose.left_eye, None);
        assert_eq!(pose.right_shoulder, Some(Point::new(250.0, 250.0)));
        assert!(!pose.is_empty());
        assert!(PoseLandmarks::default().is_empty());
    }
}
