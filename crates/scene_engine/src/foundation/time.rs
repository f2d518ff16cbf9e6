//! Time management utilities
//!
//! [`Time`] tracks two clocks driven by the host's timestamps: a variable
//! frame clock with a wrapping day cycle, and a fixed-step physics
//! accumulator. [`Stopwatch`] supplies wall-clock timestamps for hosts that
//! don't have their own.

use std::time::{Duration, Instant};

use crate::core::config::TimeConfig;

/// Frame and physics clocks for a scene
#[derive(Debug, Clone)]
pub struct Time {
    /// Real seconds per full day cycle
    pub day_duration: f32,

    /// Multiplier applied to the day cycle only
    pub scale: f32,

    fixed_step: Duration,
    max_fixed_steps: u32,
    delta_time: f32,
    day_delta_time: f32,
    day_time: f32,
    system_time: Duration,
    physics_time: Duration,
    started: bool,
    frame_count: u64,
    dropped_fixed_steps: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new(&TimeConfig::default())
    }
}

impl Time {
    /// Create clocks from configuration
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            day_duration: config.day_duration,
            scale: config.scale,
            fixed_step: Duration::from_millis(config.fixed_step_ms),
            max_fixed_steps: config.max_fixed_steps_per_frame,
            delta_time: 0.0,
            day_delta_time: 0.0,
            day_time: 0.0,
            system_time: Duration::ZERO,
            physics_time: Duration::ZERO,
            started: false,
            frame_count: 0,
            dropped_fixed_steps: 0,
        }
    }

    fn start(&mut self, now: Duration) {
        if !self.started {
            self.started = true;
            self.system_time = now;
            self.physics_time = now;
        }
    }

    /// Count the fixed steps due at `now` and advance the physics accumulator.
    ///
    /// The first call only initializes the clock. At most
    /// `max_fixed_steps_per_frame` steps are returned; whole steps beyond the
    /// cap are dropped while the sub-step remainder is carried.
    pub fn consume_fixed_steps(&mut self, now: Duration) -> u32 {
        if !self.started {
            self.start(now);
            return 0;
        }
        if self.fixed_step.is_zero() {
            return 0;
        }

        let mut steps = 0;
        while now.saturating_sub(self.physics_time) >= self.fixed_step {
            if steps == self.max_fixed_steps {
                let backlog = now.saturating_sub(self.physics_time);
                let dropped = backlog.as_nanos() / self.fixed_step.as_nanos();
                let dropped = u32::try_from(dropped).unwrap_or(u32::MAX);
                self.physics_time += self.fixed_step * dropped;
                self.dropped_fixed_steps += u64::from(dropped);
                log::warn!(
                    "Physics fell behind, dropped {} fixed steps ({:?} backlog)",
                    dropped,
                    backlog
                );
                break;
            }
            steps += 1;
            self.physics_time += self.fixed_step;
        }
        steps
    }

    /// Advance the variable clock and the day cycle to `now`
    pub fn advance(&mut self, now: Duration) {
        self.start(now);

        self.delta_time = now.saturating_sub(self.system_time).as_secs_f32();
        self.system_time = now;
        self.day_delta_time = self.delta_time * self.scale;
        if self.day_duration > 0.0 {
            self.day_time += self.day_delta_time / self.day_duration;
            self.day_time -= self.day_time.floor();
        }
        self.frame_count += 1;
    }

    /// Seconds since the previous frame, unscaled
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Frame delta multiplied by the day-cycle scale
    pub fn day_delta_time(&self) -> f32 {
        self.day_delta_time
    }

    /// Constant physics step in seconds
    pub fn fixed_delta_time(&self) -> f32 {
        self.fixed_step.as_secs_f32()
    }

    /// Constant physics step
    pub fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    /// Fraction of the day cycle in `[0, 1)`
    pub fn day_time(&self) -> f32 {
        self.day_time
    }

    /// Jump the day cycle to `day_time`, wrapped into `[0, 1)`
    pub fn set_day_time(&mut self, day_time: f32) {
        self.day_time = day_time - day_time.floor();
    }

    /// Timestamp of the last variable update
    pub fn system_time(&self) -> Duration {
        self.system_time
    }

    /// Time not yet consumed by fixed steps
    pub fn physics_remainder(&self) -> Duration {
        self.system_time.saturating_sub(self.physics_time)
    }

    /// Number of variable updates so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Fixed steps skipped because the per-frame cap was reached
    pub fn dropped_fixed_steps(&self) -> u64 {
        self.dropped_fixed_steps
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Total elapsed time including the running segment
    pub fn elapsed(&self) -> Duration {
        self.elapsed + self.start_time.map_or(Duration::ZERO, |start| start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn time_with_step(step_ms: u64) -> Time {
        Time::new(&TimeConfig::default().with_fixed_step_ms(step_ms))
    }

    #[test]
    fn test_first_update_has_zero_delta() {
        let mut time = Time::default();
        time.advance(Duration::from_secs(100));
        assert_relative_eq!(time.delta_time(), 0.0);
        time.advance(Duration::from_millis(100_250));
        assert_relative_eq!(time.delta_time(), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_steps_carry_remainder() {
        let mut time = time_with_step(20);
        assert_eq!(time.consume_fixed_steps(Duration::ZERO), 0);
        time.advance(Duration::ZERO);

        assert_eq!(time.consume_fixed_steps(Duration::from_millis(65)), 3);
        time.advance(Duration::from_millis(65));
        assert_eq!(time.physics_remainder(), Duration::from_millis(5));

        assert_eq!(time.consume_fixed_steps(Duration::from_millis(80)), 1);
    }

    #[test]
    fn test_fixed_step_backlog_is_capped() {
        let config = TimeConfig::default()
            .with_fixed_step_ms(10)
            .with_max_fixed_steps_per_frame(4);
        let mut time = Time::new(&config);
        time.consume_fixed_steps(Duration::ZERO);

        assert_eq!(time.consume_fixed_steps(Duration::from_millis(1_005)), 4);
        assert_eq!(time.dropped_fixed_steps(), 96);
        time.advance(Duration::from_millis(1_005));
        assert_eq!(time.physics_remainder(), Duration::from_millis(5));
    }

    #[test]
    fn test_day_time_wraps() {
        let mut time = Time::new(&TimeConfig::default().with_day_duration(10.0));
        time.advance(Duration::ZERO);
        time.set_day_time(0.95);
        time.advance(Duration::from_secs(1));
        assert_relative_eq!(time.day_time(), 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_scale_freezes_day_only() {
        let mut time = Time::default();
        time.scale = 0.0;
        time.advance(Duration::ZERO);
        time.set_day_time(0.3);
        time.advance(Duration::from_secs(2));
        assert_relative_eq!(time.day_time(), 0.3);
        assert_relative_eq!(time.delta_time(), 2.0);
        assert_relative_eq!(time.fixed_delta_time(), 0.02, epsilon = 1e-6);
    }

    #[test]
    fn test_stopwatch_accumulates() {
        let mut stopwatch = Stopwatch::start_new();
        stopwatch.stop();
        let first = stopwatch.elapsed();
        assert_eq!(stopwatch.elapsed(), first);
    }
}
