//! Pause flag and speed multiplier shared by every time-based update.

use tracing::warn;

/// Factor used when the configured speed step is unusable.
pub const DEFAULT_SPEED_STEP: f32 = 1.2;

/// Multiplier used when the configured initial speed is unusable.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Speeds must be finite and positive, or time stalls or runs backwards.
fn is_usable_speed(speed: f32) -> bool {
    speed.is_finite() && speed > 0.0
}

/// The simulation clock.
///
/// Speed changes are multiplicative. With no bounds configured the speed can
/// grow or shrink without limit.
#[derive(Clone, Debug, PartialEq)]
pub struct SimClock {
    paused: bool,
    speed: f32,
    step: f32,
    min_speed: Option<f32>,
    max_speed: Option<f32>,
}

impl SimClock {
    pub fn new(speed: f32, step: f32, paused: bool) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            warn!(step, "Unusable speed step, using {DEFAULT_SPEED_STEP}");
            DEFAULT_SPEED_STEP
        };
        let speed = if is_usable_speed(speed) {
            speed
        } else {
            warn!(speed, "Unusable initial speed, using {DEFAULT_SPEED}");
            DEFAULT_SPEED
        };
        Self {
            paused,
            speed,
            step,
            min_speed: None,
            max_speed: None,
        }
    }

    /// Clamp future speed changes to the given bounds. Bounds that are not
    /// positive and finite are ignored.
    #[must_use]
    pub fn with_bounds(mut self, min_speed: Option<f32>, max_speed: Option<f32>) -> Self {
        let usable = |bound: Option<f32>, name: &str| {
            bound.filter(|&b| {
                let ok = is_usable_speed(b);
                if !ok {
                    warn!(bound = b, "Ignoring unusable {name} speed bound");
                }
                ok
            })
        };
        self.min_speed = usable(min_speed, "min");
        self.max_speed = usable(max_speed, "max");
        self.speed = self.clamp(self.speed);
        self
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Flip the pause flag and return the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Multiply the speed by the step factor and return the new speed.
    pub fn speed_up(&mut self) -> f32 {
        self.speed = self.clamp(self.speed * self.step);
        self.speed
    }

    /// Divide the speed by the step factor and return the new speed.
    pub fn slow_down(&mut self) -> f32 {
        self.speed = self.clamp(self.speed / self.step);
        self.speed
    }

    /// Frame time converted to simulated time; zero while paused.
    pub fn scaled(&self, dt: f32) -> f32 {
        if self.paused { 0.0 } else { dt * self.speed }
    }

    fn clamp(&self, speed: f32) -> f32 {
        let speed = self.min_speed.map_or(speed, |min| speed.max(min));
        self.max_speed.map_or(speed, |max| speed.min(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_pause() {
        let mut clock = SimClock::new(5.0, 1.2, false);
        assert!(clock.toggle_pause());
        assert!(!clock.toggle_pause());
    }

    #[test]
    fn test_speed_up_and_slow_down_are_inverse() {
        let mut clock = SimClock::new(5.0, 1.2, false);
        assert!((clock.speed_up() - 6.0).abs() < 1e-5);
        assert!((clock.slow_down() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut clock = SimClock::new(1.0, 1.2, false);
        for _ in 0..100 {
            clock.speed_up();
        }
        assert!(clock.speed() > 1.0e7);
        for _ in 0..200 {
            clock.slow_down();
        }
        assert!(clock.speed() < 1.0e-7);
        assert!(clock.speed() > 0.0);
    }

    #[test]
    fn test_bounds_clamp_speed() {
        let mut clock = SimClock::new(5.0, 1.2, false).with_bounds(Some(0.5), Some(8.0));
        for _ in 0..10 {
            clock.speed_up();
        }
        assert_eq!(clock.speed(), 8.0);
        for _ in 0..50 {
            clock.slow_down();
        }
        assert_eq!(clock.speed(), 0.5);
    }

    #[test]
    fn test_scaled_is_zero_when_paused() {
        let mut clock = SimClock::new(5.0, 1.2, false);
        assert_eq!(clock.scaled(0.5), 2.5);
        clock.toggle_pause();
        assert_eq!(clock.scaled(0.5), 0.0);
    }

    #[test]
    fn test_unusable_initial_speed_falls_back() {
        for speed in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let mut clock = SimClock::new(speed, 1.2, false);
            assert_eq!(clock.speed(), DEFAULT_SPEED);
            assert!(clock.speed_up() > DEFAULT_SPEED);
            assert!(clock.scaled(1.0) > 0.0);
        }
    }

    #[test]
    fn test_non_positive_bounds_ignored() {
        let mut clock = SimClock::new(5.0, 1.2, false).with_bounds(Some(-1.0), Some(0.0));
        assert_eq!(clock.speed(), 5.0);
        for _ in 0..10 {
            clock.slow_down();
        }
        assert!(clock.speed() > 0.0);
        assert!(clock.speed() < 1.0);
    }

    #[test]
    fn test_invalid_step_falls_back() {
        let mut clock = SimClock::new(1.0, 0.0, false);
        assert!((clock.speed_up() - DEFAULT_SPEED_STEP).abs() < 1e-6);
    }
}
