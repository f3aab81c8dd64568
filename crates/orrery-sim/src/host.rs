//! Capabilities the simulation needs from its host.
//!
//! The window, the input devices and the render camera all live outside
//! this crate. These traits are the only way the simulation talks to them.

use std::collections::VecDeque;

use crate::command::SimCommand;
use crate::pose::CameraPose;

/// Supplies the real time elapsed since the previous frame.
pub trait TimeSource {
    /// Seconds since the last call. Never negative.
    fn delta_seconds(&mut self) -> f32;
}

/// Supplies queued user commands.
pub trait CommandSource {
    fn next_command(&mut self) -> Option<SimCommand>;
}

/// Receives the camera pose and free-look handoff.
pub trait PoseSink {
    /// Called once per frame with the current camera pose.
    fn apply_pose(&mut self, pose: &CameraPose);

    /// Called exactly once when the scripted fly-through ends.
    fn begin_free_look(&mut self, pose: &CameraPose);

    /// Called on restart, before the fresh pose is applied.
    fn end_free_look(&mut self) {}
}

/// A time source that always reports the same step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedDelta(pub f32);

impl TimeSource for FixedDelta {
    fn delta_seconds(&mut self) -> f32 {
        self.0.max(0.0)
    }
}

impl CommandSource for VecDeque<SimCommand> {
    fn next_command(&mut self) -> Option<SimCommand> {
        self.pop_front()
    }
}
