//! Fixed per-body constants and the mutable per-planet state.

use glam::Vec3;

/// A flat, tinted disc around a planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSpec {
    /// Diameter of the ring quad relative to the planet's own scale.
    pub scale: f32,
    /// Tint as 8-bit RGBA; alpha controls translucency.
    pub rgba: [u8; 4],
    /// Vertical offset above the planet's equator, in planet-local units.
    pub y_offset: f32,
}

impl RingSpec {
    /// Tint as linear 0..1 floats.
    pub fn color(&self) -> [f32; 4] {
        self.rgba.map(|c| f32::from(c) / 255.0)
    }
}

/// Static description of one planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetSpec {
    pub name: &'static str,
    /// Distance from the sun; the orbit is a circle in the XZ plane.
    pub orbit_radius: f32,
    /// Orbital angular speed in radians per simulated second.
    pub orbit_speed: f32,
    /// Self-rotation speed in degrees per simulated second.
    pub spin_speed: f32,
    /// Rendered diameter.
    pub scale: f32,
    /// Texture file name, relative to the asset directory.
    pub texture: &'static str,
    pub ring: Option<RingSpec>,
}

/// A body that sits at the origin and only spins (the sun and the sky).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticBody {
    pub name: &'static str,
    pub scale: f32,
    pub texture: &'static str,
    /// Degrees per simulated second about the Y axis.
    pub spin_speed: f32,
}

pub const SUN: StaticBody = StaticBody {
    name: "sun",
    scale: 5.0,
    texture: "sun.png",
    spin_speed: 10.0,
};

/// The background sphere, seen from the inside.
pub const SKY: StaticBody = StaticBody {
    name: "sky",
    scale: 1000.0,
    texture: "background.jpg",
    spin_speed: 0.1,
};

/// Texture shared by all rings.
pub const RING_TEXTURE: &str = "ring.png";

/// Name of the planet the camera fly-through follows.
pub const EARTH: &str = "earth";

/// The eight planets, innermost first.
pub const PLANETS: [PlanetSpec; 8] = [
    PlanetSpec {
        name: "mercury",
        orbit_radius: 6.0,
        orbit_speed: 1.6,
        spin_speed: 60.0,
        scale: 0.1,
        texture: "mercury.png",
        ring: None,
    },
    PlanetSpec {
        name: "venus",
        orbit_radius: 8.0,
        orbit_speed: 1.2,
        spin_speed: 70.0,
        scale: 0.3,
        texture: "venus.jpg",
        ring: None,
    },
    PlanetSpec {
        name: EARTH,
        orbit_radius: 10.0,
        orbit_speed: 1.0,
        spin_speed: 65.0,
        scale: 0.35,
        texture: "earth.jpg",
        ring: None,
    },
    PlanetSpec {
        name: "mars",
        orbit_radius: 12.0,
        orbit_speed: 0.8,
        spin_speed: 70.0,
        scale: 0.15,
        texture: "mars.jpg",
        ring: None,
    },
    PlanetSpec {
        name: "jupiter",
        orbit_radius: 15.0,
        orbit_speed: 0.6,
        spin_speed: 150.0,
        scale: 0.9,
        texture: "jupiter.jpg",
        ring: Some(RingSpec {
            scale: 1.1,
            rgba: [140, 140, 140, 60],
            y_offset: 0.04,
        }),
    },
    PlanetSpec {
        name: "saturn",
        orbit_radius: 18.0,
        orbit_speed: 0.5,
        spin_speed: 100.0,
        scale: 0.6,
        texture: "saturn.jpg",
        ring: Some(RingSpec {
            scale: 1.8,
            rgba: [150, 150, 150, 160],
            y_offset: 0.05,
        }),
    },
    PlanetSpec {
        name: "uranus",
        orbit_radius: 21.0,
        orbit_speed: 0.4,
        spin_speed: 80.0,
        scale: 0.5,
        texture: "uranus.png",
        ring: Some(RingSpec {
            scale: 1.4,
            rgba: [130, 180, 230, 50],
            y_offset: 0.045,
        }),
    },
    PlanetSpec {
        name: "neptune",
        orbit_radius: 24.0,
        orbit_speed: 0.3,
        spin_speed: 80.0,
        scale: 0.45,
        texture: "neptune.jpg",
        ring: Some(RingSpec {
            scale: 1.2,
            rgba: [80, 130, 230, 40],
            y_offset: 0.04,
        }),
    },
];

/// Live state of one planet.
#[derive(Clone, Debug, PartialEq)]
pub struct Planet {
    pub spec: PlanetSpec,
    /// Orbital angle in radians. Accumulates without wrapping.
    pub angle: f32,
    /// Self-rotation about Y in degrees, kept in `[0, 360)`.
    pub spin: f32,
    /// Position derived from `angle` and the orbit radius.
    pub position: Vec3,
}

impl Planet {
    /// A planet at angle zero, i.e. on the +X axis.
    pub fn new(spec: PlanetSpec) -> Self {
        let mut planet = Self {
            spec,
            angle: 0.0,
            spin: 0.0,
            position: Vec3::ZERO,
        };
        planet.position = planet.orbit_position();
        planet
    }

    /// Point on the orbit circle for the current angle.
    pub fn orbit_position(&self) -> Vec3 {
        let r = self.spec.orbit_radius;
        Vec3::new(r * self.angle.cos(), 0.0, r * self.angle.sin())
    }

    /// Advance by `scaled_dt` simulated seconds.
    pub fn advance(&mut self, scaled_dt: f32) {
        self.angle += scaled_dt * self.spec.orbit_speed;
        self.spin = (self.spin + scaled_dt * self.spec.spin_speed).rem_euclid(360.0);
        self.position = self.orbit_position();
    }
}
