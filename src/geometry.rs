//! 2D vector helpers used by calibration and classification.
//!
//! Angles come from the dot-product identity `cos(θ) = a·b / (|a|·|b|)`,
//! computed on normalized inputs.

use serde::{Deserialize, Serialize};

/// A 2D offset in image-pixel space (e.g. eye → shoulder).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Rotates by `degrees` counter-clockwise (in a y-up frame).
    pub fn rotated(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

/// Scales `v` to unit length. The zero vector maps to itself.
pub fn normalize(v: Vector) -> Vector {
    let len = v.length();
    if len == 0.0 {
        Vector::ZERO
    } else {
        Vector::new(v.x / len, v.y / len)
    }
}

pub fn dot(a: Vector, b: Vector) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Unsigned angle between `a` and `b` in degrees, in `[0, 180]`.
///
/// If either input is the zero vector the normalized dot product is 0 and
/// the result is 90°.
pub fn angle_between(a: Vector, b: Vector) -> f64 {
    // Rounding can push the cosine just outside [-1, 1], where acos is NaN.
    let cos = dot(normalize(a), normalize(b)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize(Vector::new(3.0, -4.0));
        assert!((n.length() - 1.0).abs() < EPS);
        assert!((n.x - 0.6).abs() < EPS);
        assert!((n.y + 0.8).abs() < EPS);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(Vector::ZERO), Vector::ZERO);
    }

    #[test]
    fn test_angle_with_itself_is_zero() {
        for v in [
            Vector::new(0.0, -100.0),
            Vector::new(1e-3, 7.5),
            Vector::new(-250.0, 33.3),
            Vector::new(0.1, 0.1),
        ] {
            assert!(angle_between(v, v).abs() < 1e-4, "{v:?}");
        }
    }

    #[test]
    fn test_angle_is_symmetric() {
        let a = Vector::new(12.0, -80.0);
        let b = Vector::new(-30.0, -95.0);
        assert!((angle_between(a, b) - angle_between(b, a)).abs() < EPS);
    }

    #[test]
    fn test_angle_range() {
        let base = Vector::new(0.0, -100.0);
        for step in 0..=72 {
            let other = base.rotated(step as f64 * 5.0);
            let angle = angle_between(base, other);
            assert!((0.0..=180.0).contains(&angle), "{angle}");
        }
        let opposite = angle_between(Vector::new(1.0, 0.0), Vector::new(-1.0, 0.0));
        assert!((opposite - 180.0).abs() < EPS);
    }

    #[test]
    fn test_zero_vector_is_ninety_degrees() {
        let v = Vector::new(5.0, 2.0);
        assert!((angle_between(Vector::ZERO, v) - 90.0).abs() < EPS);
        assert!((angle_between(v, Vector::ZERO) - 90.0).abs() < EPS);
        assert!((angle_between(Vector::ZERO, Vector::ZERO) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_by_fifteen_degrees() {
        let base = Vector::new(0.0, -100.0);
        let angle = angle_between(base, base.rotated(15.0));
        assert!((angle - 15.0).abs() < 0.01);
    }
}
