//! Utility functions for image preparation, numeric conversion and timing.

pub mod safe_cast;
pub mod image_conversion;

use std::time::Instant;

/// Instantaneous frame rate from the time between consecutive frames
#[derive(Debug, Default)]
pub struct FpsCounter {
    previous: Option<Instant>,
    fps: f64,
}

impl FpsCounter {
    /// Create a counter with no frames seen
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: None, fps: 0.0 }
    }

    /// Register a frame now and return the current rate
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Register a frame at `now` and return the current rate
    ///
    /// The first frame, or a frame with no measurable elapsed time, yields 0.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        self.fps = match self.previous {
            Some(previous) => {
                let elapsed = now.saturating_duration_since(previous).as_secs_f64();
                if elapsed > 0.0 {
                    1.0 / elapsed
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.previous = Some(now);
        self.fps
    }

    /// Rate computed at the last tick
    #[must_use]
    pub const fn fps(&self) -> f64 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_is_zero() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.tick_at(Instant::now()), 0.0);
    }

    #[test]
    fn test_rate_from_interval() {
        let mut counter = FpsCounter::new();
        let start = Instant::now();
        counter.tick_at(start);
        let fps = counter.tick_at(start + Duration::from_millis(40));
        assert!((fps - 25.0).abs() < 1e-6);
        assert!((counter.fps() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_interval() {
        let mut counter = FpsCounter::new();
        let start = Instant::now();
        counter.tick_at(start);
        assert_eq!(counter.tick_at(start), 0.0);
    }
}
