use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

/// Short decaying sine tone used as the slouch alert.
pub struct Chime {
    sample_rate: u32,
    frequency: f32,
    sample_idx: u64,
    total_samples: u64,
}

impl Chime {
    pub fn new(frequency: f32, duration: Duration) -> Self {
        let sample_rate = 44100;
        Self {
            sample_rate,
            frequency,
            sample_idx: 0,
            total_samples: (duration.as_secs_f64() * sample_rate as f64) as u64,
        }
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sample_idx >= self.total_samples {
            return None;
        }

        let t = self.sample_idx as f32 / self.sample_rate as f32;
        // Linear fade so the tone does not click off.
        let envelope = 1.0 - self.sample_idx as f32 / self.total_samples as f32;
        self.sample_idx += 1;

        Some((TAU * self.frequency * t).sin() * envelope * 0.4)
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.total_samples as f64 / self.sample_rate as f64,
        ))
    }
}
