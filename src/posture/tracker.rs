use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::classifier::Deviation;
use super::config::PostureConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PostureStatus {
    /// No baseline yet, or no side overlaps with the live frame
    Detecting,
    Upright,
    Slouching,
}

impl Default for PostureStatus {
    fn default() -> Self {
        PostureStatus::Detecting
    }
}

impl PostureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureStatus::Detecting => "Detecting",
            PostureStatus::Upright => "Upright",
            PostureStatus::Slouching => "Slouching",
        }
    }
}

/// Cross-frame slouch decision layered over the stateless classifier.
///
/// Upright → Slouching once the angle has stayed `>= threshold` for
/// `sustain`. Slouching → Upright only once the angle is
/// `<= threshold - hysteresis`; in between the latched state holds. Frames
/// without an angle drop to `Detecting` and release any latch.
#[derive(Debug, Clone)]
pub struct PostureTracker {
    status: PostureStatus,
    threshold: f64,
    recovery: f64,
    sustain: Duration,
    /// Start of the current run of above-threshold frames
    above_since: Option<Instant>,
}

impl PostureTracker {
    pub fn new(config: &PostureConfig) -> Self {
        Self {
            status: PostureStatus::Detecting,
            threshold: config.threshold_degrees,
            recovery: config.recovery_degrees(),
            sustain: Duration::from_millis(config.sustain_ms),
            above_since: None,
        }
    }

    pub fn status(&self) -> PostureStatus {
        self.status
    }

    pub fn is_alerting(&self) -> bool {
        self.status == PostureStatus::Slouching
    }

    pub fn update(&mut self, deviation: &Deviation, now: Instant) -> PostureStatus {
        let Some(angle) = deviation.angle else {
            self.reset();
            return self.status;
        };

        if self.status == PostureStatus::Slouching {
            if angle <= self.recovery {
                self.status = PostureStatus::Upright;
                self.above_since = None;
            }
            return self.status;
        }

        if angle >= self.threshold {
            let since = *self.above_since.get_or_insert(now);
            self.status = if now.saturating_duration_since(since) >= self.sustain {
                PostureStatus::Slouching
            } else {
                PostureStatus::Upright
            };
        } else {
            self.above_since = None;
            self.status = PostureStatus::Upright;
        }

        self.status
    }

    pub fn reset(&mut self) {
        self.status = PostureStatus::Detecting;
        self.above_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(angle: f64) -> Deviation {
        Deviation {
            angle: Some(angle),
            slouching: angle >= 12.0,
        }
    }

    #[test]
    fn test_starts_detecting() {
        let tracker = PostureTracker::new(&PostureConfig::default());
        assert_eq!(tracker.status(), PostureStatus::Detecting);
        assert!(!tracker.is_alerting());
    }

    #[test]
    fn test_hysteresis_holds_between_thresholds() {
        let mut tracker = PostureTracker::new(&PostureConfig::default());
        let now = Instant::now();

        assert_eq!(tracker.update(&at(5.0), now), PostureStatus::Upright);
        assert_eq!(tracker.update(&at(12.0), now), PostureStatus::Slouching);
        // Raw classifier says upright at 11°, but the latch holds until 10°.
        assert_eq!(tracker.update(&at(11.0), now), PostureStatus::Slouching);
        assert_eq!(tracker.update(&at(10.5), now), PostureStatus::Slouching);
        assert_eq!(tracker.update(&at(10.0), now), PostureStatus::Upright);
        // And going back up, 11° is not enough to latch again.
        assert_eq!(tracker.update(&at(11.0), now), PostureStatus::Upright);
    }

    #[test]
    fn test_sustain_delays_latch() {
        let config = PostureConfig {
            sustain_ms: 3000,
            ..Default::default()
        };
        let mut tracker = PostureTracker::new(&config);
        let t0 = Instant::now();

        assert_eq!(tracker.update(&at(20.0), t0), PostureStatus::Upright);
        assert_eq!(
            tracker.update(&at(20.0), t0 + Duration::from_millis(2000)),
            PostureStatus::Upright
        );
        assert_eq!(
            tracker.update(&at(20.0), t0 + Duration::from_millis(3000)),
            PostureStatus::Slouching
        );
    }

    #[test]
    fn test_dip_below_threshold_restarts_sustain() {
        let config = PostureConfig {
            sustain_ms: 3000,
            ..Default::default()
        };
        let mut tracker = PostureTracker::new(&config);
        let t0 = Instant::now();

        tracker.update(&at(20.0), t0);
        tracker.update(&at(8.0), t0 + Duration::from_millis(2000));
        assert_eq!(
            tracker.update(&at(20.0), t0 + Duration::from_millis(4000)),
            PostureStatus::Upright
        );
        assert_eq!(
            tracker.update(&at(20.0), t0 + Duration::from_millis(7000)),
            PostureStatus::Slouching
        );
    }

    #[test]
    fn test_missing_angle_releases_latch() {
        let mut tracker = PostureTracker::new(&PostureConfig::default());
        let now = Instant::now();

        tracker.update(&at(30.0), now);
        assert!(tracker.is_alerting());

        assert_eq!(
            tracker.update(&Deviation::UNKNOWN, now),
            PostureStatus::Detecting
        );
        assert!(!tracker.is_alerting());
    }
}
