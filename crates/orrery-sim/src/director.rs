//! Scripted camera fly-through.
//!
//! The director walks through a fixed sequence of stages:
//!
//! | # | Stage          | Ends when                 |
//! |---|----------------|---------------------------|
//! | 0 | Idle           | idle delay elapsed        |
//! | 1 | Approach Earth | interpolation complete    |
//! | 2 | Orbit Earth    | orbit duration elapsed    |
//! | 3 | Pull back      | interpolation complete    |
//! | 4 | Top-down       | interpolation complete    |
//! | 5 | Return         | interpolation complete    |
//! | 6 | Finished       | never (terminal)          |
//!
//! Every stage owns one handler. A handler mutates the camera pose and, when
//! its stage is over, returns the next stage with any captured poses baked
//! into it. The stage-local timer restarts at zero on every transition and
//! only ever moves forward, so the stage index never decreases.

use std::fmt;

use glam::Vec3;
use tracing::{info, trace};

use crate::pose::CameraPose;

/// Tunable constants for the fly-through.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectorSettings {
    pub idle_duration: f32,
    pub approach_duration: f32,
    pub orbit_duration: f32,
    pub pull_back_duration: f32,
    pub top_down_duration: f32,
    pub return_duration: f32,
    /// Offset from Earth to the end of the approach.
    pub approach_offset: Vec3,
    pub approach_rotation: Vec3,
    /// Radius of the camera's circle around Earth, in Earth's XY plane.
    pub orbit_radius: f32,
    /// Radians per simulated second.
    pub orbit_speed: f32,
    /// Z distance from Earth while circling it.
    pub orbit_depth: f32,
    /// Offset from the last orbit position to the end of the pull-back.
    pub pull_back_offset: Vec3,
    pub pull_back_rotation: Vec3,
    pub top_down_pose: CameraPose,
    /// Final establishing shot; also the starting pose.
    pub home_pose: CameraPose,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            idle_duration: 2.0,
            approach_duration: 5.0,
            orbit_duration: 10.0,
            pull_back_duration: 5.0,
            top_down_duration: 5.0,
            return_duration: 5.0,
            approach_offset: Vec3::new(0.0, 1.0, -20.0),
            approach_rotation: Vec3::new(10.0, 0.0, 0.0),
            orbit_radius: 2.0,
            orbit_speed: 2.0,
            orbit_depth: -10.0,
            pull_back_offset: Vec3::new(0.0, 10.0, -30.0),
            pull_back_rotation: Vec3::new(30.0, 0.0, 0.0),
            top_down_pose: CameraPose::new(Vec3::new(0.0, 50.0, 0.0), Vec3::new(90.0, 0.0, 0.0)),
            home_pose: CameraPose::new(Vec3::new(0.0, 0.0, -40.0), Vec3::ZERO),
        }
    }
}

/// An interpolation from a captured pose to a target pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub from: CameraPose,
    pub to: CameraPose,
    pub duration: f32,
}

impl Leg {
    /// Interpolation progress for the given stage time, clamped to `[0, 1]`.
    pub fn progress(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn pose_at(&self, elapsed: f32) -> CameraPose {
        self.from.lerp(&self.to, self.progress(elapsed))
    }
}

/// A stage together with the data it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stage {
    Idle,
    ApproachEarth(Leg),
    OrbitEarth { angle: f32 },
    PullBack(Leg),
    TopDown(Leg),
    Return(Leg),
    Finished,
}

/// Stage identity without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    Idle,
    ApproachEarth,
    OrbitEarth,
    PullBack,
    TopDown,
    Return,
    Finished,
}

impl StageKind {
    /// Position in the sequence; `Finished` is the largest.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn is_terminal(self) -> bool {
        self == StageKind::Finished
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Idle => "idle",
            StageKind::ApproachEarth => "approach earth",
            StageKind::OrbitEarth => "orbit earth",
            StageKind::PullBack => "pull back",
            StageKind::TopDown => "top-down",
            StageKind::Return => "return",
            StageKind::Finished => "finished",
        };
        f.write_str(name)
    }
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Idle => StageKind::Idle,
            Stage::ApproachEarth(_) => StageKind::ApproachEarth,
            Stage::OrbitEarth { .. } => StageKind::OrbitEarth,
            Stage::PullBack(_) => StageKind::PullBack,
            Stage::TopDown(_) => StageKind::TopDown,
            Stage::Return(_) => StageKind::Return,
            Stage::Finished => StageKind::Finished,
        }
    }
}

/// A transition reported by [`CameraDirector::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageChange {
    pub from: StageKind,
    pub to: StageKind,
}

/// Drives the camera through the fly-through and signals the free-look
/// handoff exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraDirector {
    settings: DirectorSettings,
    stage: Stage,
    elapsed: f32,
    handed_off: bool,
}

impl CameraDirector {
    pub fn new(settings: DirectorSettings) -> Self {
        Self {
            settings,
            stage: Stage::Idle,
            elapsed: 0.0,
            handed_off: false,
        }
    }

    /// A director that has already finished, so the next handoff check
    /// fires immediately.
    pub fn finished(settings: DirectorSettings) -> Self {
        Self {
            stage: Stage::Finished,
            ..Self::new(settings)
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn kind(&self) -> StageKind {
        self.stage.kind()
    }

    /// Simulated seconds spent in the current stage.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn settings(&self) -> &DirectorSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        !self.kind().is_terminal()
    }

    pub fn handed_off(&self) -> bool {
        self.handed_off
    }

    /// Advance the fly-through by `scaled_dt` simulated seconds.
    ///
    /// `earth` is Earth's position after this frame's orbit update. The
    /// camera pose is written in place. Returns the transition, if one
    /// happened this frame.
    pub fn update(
        &mut self,
        scaled_dt: f32,
        earth: Vec3,
        camera: &mut CameraPose,
    ) -> Option<StageChange> {
        if !self.is_running() {
            return None;
        }
        self.elapsed += scaled_dt.max(0.0);

        let stage = self.stage;
        let next = match stage {
            Stage::Idle => self.idle(earth, camera),
            Stage::ApproachEarth(leg) => self.approach(leg, camera),
            Stage::OrbitEarth { angle } => self.orbit(angle, scaled_dt, earth, camera),
            Stage::PullBack(leg) => self.pull_back(leg, camera),
            Stage::TopDown(leg) => self.top_down(leg, camera),
            Stage::Return(leg) => {
                Self::interpolate(leg, self.elapsed, camera).then_some(Stage::Finished)
            }
            Stage::Finished => None,
        }?;

        let change = StageChange {
            from: self.kind(),
            to: next.kind(),
        };
        debug_assert!(change.to > change.from);
        self.stage = next;
        self.elapsed = 0.0;
        info!(from = %change.from, to = %change.to, "Camera stage changed");
        Some(change)
    }

    /// Returns true exactly once, on the first call after the fly-through
    /// has finished.
    pub fn take_handoff(&mut self) -> bool {
        if self.is_running() || self.handed_off {
            return false;
        }
        self.handed_off = true;
        true
    }

    fn idle(&self, earth: Vec3, camera: &CameraPose) -> Option<Stage> {
        (self.elapsed >= self.settings.idle_duration).then(|| {
            Stage::ApproachEarth(Leg {
                from: *camera,
                to: CameraPose::new(
                    earth + self.settings.approach_offset,
                    self.settings.approach_rotation,
                ),
                duration: self.settings.approach_duration,
            })
        })
    }

    fn approach(&self, leg: Leg, camera: &mut CameraPose) -> Option<Stage> {
        Self::interpolate(leg, self.elapsed, camera).then_some(Stage::OrbitEarth { angle: 0.0 })
    }

    fn orbit(
        &mut self,
        angle: f32,
        scaled_dt: f32,
        earth: Vec3,
        camera: &mut CameraPose,
    ) -> Option<Stage> {
        let s = &self.settings;
        let angle = angle + scaled_dt * s.orbit_speed;
        camera.position = earth
            + Vec3::new(
                s.orbit_radius * angle.cos(),
                s.orbit_radius * angle.sin(),
                s.orbit_depth,
            );
        camera.look_at(earth);

        if self.elapsed >= s.orbit_duration {
            return Some(Stage::PullBack(Leg {
                from: *camera,
                to: CameraPose::new(camera.position + s.pull_back_offset, s.pull_back_rotation),
                duration: s.pull_back_duration,
            }));
        }
        self.stage = Stage::OrbitEarth { angle };
        trace!(angle, "Orbiting earth");
        None
    }

    fn pull_back(&self, leg: Leg, camera: &mut CameraPose) -> Option<Stage> {
        Self::interpolate(leg, self.elapsed, camera).then(|| {
            Stage::TopDown(Leg {
                from: *camera,
                to: self.settings.top_down_pose,
                duration: self.settings.top_down_duration,
            })
        })
    }

    fn top_down(&self, leg: Leg, camera: &mut CameraPose) -> Option<Stage> {
        Self::interpolate(leg, self.elapsed, camera).then(|| {
            Stage::Return(Leg {
                from: *camera,
                to: self.settings.home_pose,
                duration: self.settings.return_duration,
            })
        })
    }

    /// Writes the interpolated pose; true once the leg is complete.
    fn interpolate(leg: Leg, elapsed: f32, camera: &mut CameraPose) -> bool {
        *camera = leg.pose_at(elapsed);
        leg.progress(elapsed) >= 1.0
    }
}
