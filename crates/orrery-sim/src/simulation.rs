//! The complete simulation state and its per-frame driver.

use std::fmt;

use glam::Vec3;
use orrery_config::Config;
use tracing::{info, warn};

use crate::clock::SimClock;
use crate::command::SimCommand;
use crate::director::{CameraDirector, DirectorSettings, StageKind};
use crate::host::{CommandSource, PoseSink, TimeSource};
use crate::orbit::SolarSystem;
use crate::pose::CameraPose;

/// Everything needed to build (and rebuild) a [`Simulation`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimSettings {
    pub initial_speed: f32,
    pub speed_step: f32,
    pub start_paused: bool,
    pub min_speed: Option<f32>,
    pub max_speed: Option<f32>,
    /// Dolly rate in units per second per scroll notch.
    pub zoom_speed: f32,
    /// Start directly in free-look.
    pub skip_intro: bool,
    pub director: DirectorSettings,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            initial_speed: 5.0,
            speed_step: 1.2,
            start_paused: false,
            min_speed: None,
            max_speed: None,
            zoom_speed: 10.0,
            skip_intro: false,
            director: DirectorSettings::default(),
        }
    }
}

impl From<&Config> for SimSettings {
    fn from(config: &Config) -> Self {
        let sim = &config.simulation;
        let cam = &config.camera;
        let (min_speed, max_speed) = sim.speed_bounds().unwrap_or_else(|err| {
            warn!(%err, "Ignoring speed bounds");
            (None, None)
        });
        let d = &cam.durations;

        Self {
            initial_speed: sim.initial_speed,
            speed_step: sim.speed_step,
            start_paused: sim.start_paused,
            min_speed,
            max_speed,
            zoom_speed: sim.zoom_speed,
            skip_intro: cam.skip_intro,
            director: DirectorSettings {
                idle_duration: d.idle,
                approach_duration: d.approach,
                orbit_duration: d.earth_orbit,
                pull_back_duration: d.pull_back,
                top_down_duration: d.top_down,
                return_duration: d.return_home,
                orbit_radius: cam.earth_orbit_radius,
                orbit_speed: cam.earth_orbit_speed,
                top_down_pose: CameraPose::new(
                    Vec3::new(0.0, cam.top_view_height, 0.0),
                    Vec3::new(90.0, 0.0, 0.0),
                ),
                home_pose: CameraPose::new(Vec3::from_array(cam.start_position), Vec3::ZERO),
                ..DirectorSettings::default()
            },
        }
    }
}

/// Snapshot of the user-visible state, for status lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimStatus {
    pub speed: f32,
    pub paused: bool,
    pub stage: StageKind,
    pub free_look: bool,
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "speed {:.2}x", self.speed)?;
        if self.paused {
            f.write_str(" | paused")?;
        }
        if self.free_look {
            f.write_str(" | free look")
        } else {
            write!(f, " | {}", self.stage)
        }
    }
}

/// Solar system, clock, camera director and camera pose, advanced together.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    settings: SimSettings,
    system: SolarSystem,
    clock: SimClock,
    director: CameraDirector,
    camera: CameraPose,
}

impl Simulation {
    pub fn new(settings: SimSettings) -> Self {
        let clock = SimClock::new(
            settings.initial_speed,
            settings.speed_step,
            settings.start_paused,
        )
        .with_bounds(settings.min_speed, settings.max_speed);
        let director = if settings.skip_intro {
            CameraDirector::finished(settings.director.clone())
        } else {
            CameraDirector::new(settings.director.clone())
        };
        let camera = settings.director.home_pose;

        Self {
            settings,
            system: SolarSystem::new(),
            clock,
            director,
            camera,
        }
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn director(&self) -> &CameraDirector {
        &self.director
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    /// Mutable camera access for the free-look controller. While the
    /// fly-through runs, the director overwrites the pose each frame.
    pub fn camera_mut(&mut self) -> &mut CameraPose {
        &mut self.camera
    }

    pub fn status(&self) -> SimStatus {
        SimStatus {
            speed: self.clock.speed(),
            paused: self.clock.paused(),
            stage: self.director.kind(),
            free_look: self.director.handed_off(),
        }
    }

    /// Drive one frame: apply queued commands, advance bodies and the
    /// fly-through unless paused, perform the one-time free-look handoff and
    /// publish the camera pose.
    pub fn frame(
        &mut self,
        time: &mut impl TimeSource,
        commands: &mut impl CommandSource,
        sink: &mut impl PoseSink,
    ) {
        let dt = time.delta_seconds();

        while let Some(command) = commands.next_command() {
            self.apply(command, dt, sink);
        }

        self.step(dt);

        if self.director.take_handoff() {
            info!(position = ?self.camera.position, "Handing camera to free look");
            sink.begin_free_look(&self.camera);
        }
        sink.apply_pose(&self.camera);
    }

    /// Advance bodies and the fly-through by `dt` real seconds.
    pub fn step(&mut self, dt: f32) {
        if self.clock.paused() {
            return;
        }
        let scaled = self.clock.scaled(dt);
        self.system.advance(scaled);
        self.director
            .update(scaled, self.system.earth_position(), &mut self.camera);
    }

    /// Apply one user command. `dt` is the current frame time, used to
    /// scale dolly distances.
    pub fn apply(&mut self, command: SimCommand, dt: f32, sink: &mut impl PoseSink) {
        match command {
            SimCommand::TogglePause => {
                if self.clock.toggle_pause() {
                    info!("Simulation paused");
                } else {
                    info!("Simulation running");
                }
            }
            SimCommand::SpeedUp => {
                let speed = self.clock.speed_up();
                info!(speed, "Simulation speed increased");
            }
            SimCommand::SlowDown => {
                let speed = self.clock.slow_down();
                info!(speed, "Simulation speed decreased");
            }
            SimCommand::Dolly(notches) => {
                self.camera.dolly(notches * self.settings.zoom_speed * dt);
            }
            SimCommand::Restart => {
                info!("Restarting simulation");
                self.reset();
                sink.end_free_look();
            }
        }
    }

    /// Rebuild every piece of state from the stored settings.
    pub fn reset(&mut self) {
        *self = Simulation::new(self.settings.clone());
    }
}
