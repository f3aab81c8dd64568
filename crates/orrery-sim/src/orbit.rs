//! Per-frame orbit and self-rotation updates.

use glam::Vec3;

use crate::planet::{EARTH, PLANETS, Planet, SKY, SUN, StaticBody};

/// A body at the origin that only turns about Y.
#[derive(Clone, Debug, PartialEq)]
pub struct Spinner {
    pub body: StaticBody,
    /// Current rotation in degrees, kept in `[0, 360)`.
    pub spin: f32,
}

impl Spinner {
    pub fn new(body: StaticBody) -> Self {
        Self { body, spin: 0.0 }
    }

    pub fn advance(&mut self, scaled_dt: f32) {
        self.spin = (self.spin + scaled_dt * self.body.spin_speed).rem_euclid(360.0);
    }
}

/// The sun, the sky sphere and all planets.
#[derive(Clone, Debug, PartialEq)]
pub struct SolarSystem {
    pub sun: Spinner,
    pub sky: Spinner,
    pub planets: Vec<Planet>,
}

impl Default for SolarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SolarSystem {
    /// Every planet at angle zero, nothing rotated.
    pub fn new() -> Self {
        Self {
            sun: Spinner::new(SUN),
            sky: Spinner::new(SKY),
            planets: PLANETS.iter().copied().map(Planet::new).collect(),
        }
    }

    /// Advance every body by `scaled_dt` simulated seconds.
    ///
    /// `scaled_dt` is frame time already multiplied by the speed multiplier.
    /// Callers skip this entirely while paused so all angles stay frozen.
    pub fn advance(&mut self, scaled_dt: f32) {
        self.sun.advance(scaled_dt);
        self.sky.advance(scaled_dt);
        for planet in &mut self.planets {
            planet.advance(scaled_dt);
        }
    }

    pub fn planet(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.spec.name == name)
    }

    /// Earth's current position, or the origin if the table has no Earth.
    pub fn earth_position(&self) -> Vec3 {
        self.planet(EARTH).map_or(Vec3::ZERO, |p| p.position)
    }
}
