//! Fixed-timestep loop.
//!
//! Wall-clock frame time goes into an accumulator that is drained in
//! [`FIXED_DT`] steps, so the simulation advances identically regardless of
//! the display's refresh rate.

use std::time::Instant;
use tracing::warn;

/// 60 Hz.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Longer frames (window drags, debugger pauses) are clamped to this and
/// the lost time is dropped instead of replayed.
pub const MAX_FRAME_TIME: f32 = 0.25;

pub struct GameLoop {
    previous_time: Instant,
    accumulator: f32,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Measure the time since the last call and run the due fixed steps.
    /// Returns how many steps ran.
    pub fn tick(&mut self, update_fn: impl FnMut(f32)) -> u32 {
        let frame_time = self.measure();
        self.advance(frame_time, update_fn)
    }

    /// Seconds since the previous call (or [`reset_clock`](Self::reset_clock)).
    pub fn measure(&mut self) -> f32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f32();
        self.previous_time = now;
        frame_time
    }

    /// Like [`tick`](Self::tick) with an explicit frame time.
    pub fn advance(&mut self, frame_time: f32, mut update_fn: impl FnMut(f32)) -> u32 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;
        let mut steps = 0;
        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT);
            self.accumulator -= FIXED_DT;
            self.total_sim_time += f64::from(FIXED_DT);
            self.update_count += 1;
            steps += 1;
        }
        self.frame_count += 1;
        steps
    }

    /// Restart timing, e.g. after the window was suspended.
    pub fn reset_clock(&mut self) {
        self.previous_time = Instant::now();
        self.accumulator = 0.0;
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        self.accumulator / FIXED_DT
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Real seconds simulated so far, before speed scaling.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_step() {
        let mut game_loop = GameLoop::new();
        let mut updates = 0;
        // A hair over one step so float error cannot leave it just short.
        let steps = game_loop.advance(FIXED_DT * 1.001, |_| updates += 1);
        assert_eq!(steps, 1);
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_multiple_steps_pass_fixed_dt() {
        let mut game_loop = GameLoop::new();
        let mut seen = Vec::new();
        game_loop.advance(3.5 * FIXED_DT, |dt| seen.push(dt));
        assert_eq!(seen, [FIXED_DT; 3]);
        assert!((game_loop.alpha() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_partial_step_carries_over() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.advance(0.6 * FIXED_DT, |_| {}), 0);
        assert_eq!(game_loop.advance(0.6 * FIXED_DT, |_| {}), 1);
        assert_eq!(game_loop.frame_count(), 2);
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut game_loop = GameLoop::new();
        let steps = game_loop.advance(10.0, |_| {});
        let max_steps = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(steps > 0 && steps <= max_steps, "got {steps} steps");
    }

    #[test]
    fn test_negative_frame_time_ignored() {
        let mut game_loop = GameLoop::new();
        assert_eq!(game_loop.advance(-1.0, |_| {}), 0);
        assert_eq!(game_loop.alpha(), 0.0);
    }

    #[test]
    fn test_total_sim_time_tracks_updates() {
        let mut game_loop = GameLoop::new();
        for _ in 0..10 {
            game_loop.advance(FIXED_DT * 2.0, |_| {});
        }
        let expected = game_loop.update_count() as f64 * f64::from(FIXED_DT);
        assert!((game_loop.total_sim_time() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clock_clears_accumulator() {
        let mut game_loop = GameLoop::new();
        game_loop.advance(0.5 * FIXED_DT, |_| {});
        game_loop.reset_clock();
        assert_eq!(game_loop.alpha(), 0.0);
    }

    #[test]
    fn test_default_is_fresh() {
        let game_loop = GameLoop::default();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.update_count(), 0);
        assert_eq!(game_loop.total_sim_time(), 0.0);
    }
}
