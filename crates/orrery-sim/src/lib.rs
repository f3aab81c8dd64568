//! Headless solar-system simulation.
//!
//! Owns everything that changes over time: planet orbits and spins, the
//! simulation clock, the scripted camera fly-through and the user commands
//! that steer them. The host (window, renderer, input devices) plugs in
//! through the traits in [`host`], so the whole core runs in unit tests
//! without a GPU.

pub mod clock;
pub mod command;
pub mod director;
pub mod host;
pub mod orbit;
pub mod planet;
pub mod pose;
pub mod simulation;

pub use clock::SimClock;
pub use command::SimCommand;
pub use director::{CameraDirector, DirectorSettings, Leg, Stage, StageChange, StageKind};
pub use host::{CommandSource, FixedDelta, PoseSink, TimeSource};
pub use orbit::{SolarSystem, Spinner};
pub use planet::{EARTH, PLANETS, Planet, PlanetSpec, RING_TEXTURE, RingSpec, SKY, SUN, StaticBody};
pub use pose::CameraPose;
pub use simulation::{SimSettings, SimStatus, Simulation};
