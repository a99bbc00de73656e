//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
///
/// Produces per-frame elapsed time in seconds. The first frame after
/// creation and any frame longer than `max_dt` are clamped, so a long
/// pause (startup, a debugger, a suspended host) never reaches systems
/// as a physics-breaking spike.
pub struct Timer {
    last_frame: Instant,
    max_dt: f32,
    total_time: f32,
    frame_count: u64,
}

impl Timer {
    /// Create a new timer clamping per-frame deltas to `max_dt` seconds
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            max_dt,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the timer and return the elapsed seconds since the
    /// previous call, clamped to `max_dt` (should be called once per frame)
    pub fn tick(&mut self) -> f32 {
        self.advance(Instant::now())
    }

    /// Advance the timer to an explicit timestamp
    ///
    /// Hosts that own their own clock (and tests) drive this directly;
    /// out-of-order timestamps yield a zero delta rather than a panic.
    pub fn advance(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last_frame);
        let dt = elapsed.as_secs_f32().min(self.max_dt);
        self.last_frame = now;
        self.total_time += dt;
        self.frame_count += 1;
        dt
    }

    /// Get the total clamped time accumulated since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn dt_is_non_negative_and_clamped() {
        let mut timer = Timer::new(0.25);
        let start = Instant::now();

        for i in 1..=10 {
            let dt = timer.advance(start + Duration::from_millis(16 * i));
            assert!(dt >= 0.0);
            assert!(dt <= 0.25);
        }
    }

    #[test]
    fn dt_sum_matches_mocked_clock() {
        let mut timer = Timer::new(0.25);
        let start = Instant::now();
        timer.advance(start);

        let mut sum = 0.0;
        for i in 1..=60 {
            sum += timer.advance(start + Duration::from_millis(16 * i));
        }

        assert_relative_eq!(sum, 0.96, epsilon = 1e-3);
        assert_relative_eq!(timer.total_time(), 0.96, epsilon = 1e-3);
    }

    #[test]
    fn long_pause_is_clamped() {
        let mut timer = Timer::new(0.25);
        let start = Instant::now();
        timer.advance(start);

        let dt = timer.advance(start + Duration::from_secs(5));
        assert_relative_eq!(dt, 0.25);
    }

    #[test]
    fn out_of_order_timestamp_yields_zero() {
        let mut timer = Timer::new(0.25);
        let start = Instant::now();
        timer.advance(start + Duration::from_secs(1));

        let dt = timer.advance(start);
        assert_relative_eq!(dt, 0.0);
    }

    #[test]
    fn frame_count_tracks_ticks() {
        let mut timer = Timer::new(0.25);
        let start = Instant::now();
        for i in 0..5 {
            timer.advance(start + Duration::from_millis(10 * i));
        }
        assert_eq!(timer.frame_count(), 5);
    }
}
