//! Free-look camera, active once the scripted fly-through has handed over.
//!
//! Holding the look action turns the camera with the mouse; the movement
//! actions fly it along its own axes, with up/down along world Y.

use glam::{Vec2, Vec3};
use orrery_input::{Action, ActionState};
use orrery_sim::CameraPose;

/// Pitch limit in degrees, short of straight up/down so yaw stays defined.
pub const PITCH_LIMIT: f32 = 89.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FreeLook {
    active: bool,
    /// Degrees, positive turns right.
    yaw: f32,
    /// Degrees, positive looks down.
    pitch: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    /// Units per second.
    pub move_speed: f32,
}

impl FreeLook {
    #[must_use]
    pub fn new(sensitivity: f32, move_speed: f32) -> Self {
        Self {
            active: false,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity,
            move_speed,
        }
    }

    /// Take over from `pose` without a visible jump.
    pub fn activate(&mut self, pose: &CameraPose) {
        self.active = true;
        self.yaw = pose.rotation.y;
        self.pitch = pose.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Apply one step of look and movement input to `pose`. Does nothing
    /// while inactive.
    pub fn update(&mut self, actions: &ActionState, mouse_delta: Vec2, dt: f32, pose: &mut CameraPose) {
        if !self.active {
            return;
        }

        if actions.is_action_active(Action::Look) {
            self.yaw = (self.yaw + mouse_delta.x * self.sensitivity).rem_euclid(360.0);
            self.pitch = (self.pitch + mouse_delta.y * self.sensitivity)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        pose.rotation = Vec3::new(self.pitch, self.yaw, 0.0);

        let direction = pose.forward() * actions.axis(Action::MoveForward, Action::MoveBackward)
            + pose.right() * actions.axis(Action::MoveRight, Action::MoveLeft)
            + Vec3::Y * actions.axis(Action::MoveUp, Action::MoveDown);
        if let Some(direction) = direction.try_normalize() {
            pose.position += direction * self.move_speed * dt;
        }
    }
}
