use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::landmarks::{Point, PoseLandmarks};

/// Producer of one landmark snapshot per capture cycle.
///
/// `Ok(None)` means no body was found in the frame. Errors stay at this
/// boundary: the capture loop logs them and skips the cycle.
pub trait PoseSource: Send {
    fn name(&self) -> &str;

    fn detect(&mut self) -> Result<Option<PoseLandmarks>>;
}

/// Deterministic stand-in for a real detector.
///
/// Eyes stay fixed while both shoulders drop by `sin(frame / 5) * 15` px. A
/// pure drop only stretches the eye→shoulder vectors, so the deviation stays
/// at 0° unless a sideways `lean_px` swing is configured as well.
pub struct StubPoseSource {
    frame: u64,
    lean_px: f64,
    jitter_px: f64,
    rng: StdRng,
}

impl StubPoseSource {
    const AMPLITUDE_PX: f64 = 15.0;
    const PERIOD_DIVISOR: f64 = 5.0;

    pub fn new() -> Self {
        Self {
            frame: 0,
            lean_px: 0.0,
            jitter_px: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Shoulders also swing sideways by `sin(frame / 5) * lean_px`.
    pub fn with_lean(mut self, lean_px: f64) -> Self {
        self.lean_px = lean_px;
        self
    }

    /// Adds uniform noise of up to `jitter_px` to every landmark.
    pub fn with_jitter(mut self, jitter_px: f64, seed: u64) -> Self {
        self.jitter_px = jitter_px.abs();
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn noisy(&mut self, x: f64, y: f64) -> Point {
        if self.jitter_px == 0.0 {
            return Point::new(x, y);
        }
        let j = self.jitter_px;
        Point::new(
            x + self.rng.gen_range(-j..=j),
            y + self.rng.gen_range(-j..=j),
        )
    }
}

impl Default for StubPoseSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseSource for StubPoseSource {
    fn name(&self) -> &str {
        "stub"
    }

    fn detect(&mut self) -> Result<Option<PoseLandmarks>> {
        let phase = (self.frame as f64 / Self::PERIOD_DIVISOR).sin();
        let drop = phase * Self::AMPLITUDE_PX;
        let lean = phase * self.lean_px;
        self.frame += 1;

        Ok(Some(PoseLandmarks {
            left_eye: Some(self.noisy(100.0, 100.0)),
            right_eye: Some(self.noisy(200.0, 100.0)),
            left_shoulder: Some(self.noisy(100.0 + lean, 200.0 + drop)),
            right_shoulder: Some(self.noisy(200.0 + lean, 200.0 + drop)),
            nose: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_is_deterministic() {
        let mut a = StubPoseSource::new();
        let mut b = StubPoseSource::new();
        for _ in 0..20 {
            assert_eq!(a.detect().unwrap(), b.detect().unwrap());
        }
        assert_eq!(a.frame(), 20);
    }

    #[test]
    fn test_stub_first_frame_is_upright() {
        let pose = StubPoseSource::new().detect().unwrap().unwrap();
        assert_eq!(pose.left_eye, Some(Point::new(100.0, 100.0)));
        assert_eq!(pose.left_shoulder, Some(Point::new(100.0, 200.0)));
        assert_eq!(pose.right_shoulder, Some(Point::new(200.0, 200.0)));
    }

    #[test]
    fn test_lean_moves_shoulders_sideways() {
        let mut source = StubPoseSource::new().with_lean(40.0);
        source.detect().unwrap();
        let pose = source.detect().unwrap().unwrap();
        let expected = 100.0 + (1.0f64 / 5.0).sin() * 40.0;
        assert!((pose.left_shoulder.unwrap().x - expected).abs() < 1e-9);
        assert_eq!(pose.left_eye, Some(Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut source = StubPoseSource::new().with_jitter(2.0, 7);
        for _ in 0..50 {
            let pose = source.detect().unwrap().unwrap();
            let eye = pose.left_eye.unwrap();
            assert!((eye.x - 100.0).abs() <= 2.0);
            assert!((eye.y - 100.0).abs() <= 2.0);
        }
    }
}
