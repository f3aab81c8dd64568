//! Window-side implementations of the simulation's host traits.

use std::collections::VecDeque;

use orrery_input::{Action, ActionState};
use orrery_render::SceneCamera;
use orrery_sim::{CameraPose, CommandSource, PoseSink, SimCommand};
use tracing::debug;

use crate::free_look::FreeLook;

/// Turns resolved input into simulation commands.
#[derive(Debug, Default)]
pub struct ActionCommands {
    queue: VecDeque<SimCommand>,
}

impl ActionCommands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for every one-shot action that fired this frame and
    /// a dolly for any scroll.
    pub fn collect(&mut self, actions: &ActionState, scroll_notches: f32) {
        for action in actions.just_activated() {
            let command = match action {
                Action::TogglePause => SimCommand::TogglePause,
                Action::SpeedUp => SimCommand::SpeedUp,
                Action::SlowDown => SimCommand::SlowDown,
                Action::Restart => SimCommand::Restart,
                _ => continue,
            };
            debug!(?action, "Queued command");
            self.queue.push_back(command);
        }
        if scroll_notches != 0.0 {
            self.queue.push_back(SimCommand::Dolly(scroll_notches));
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl CommandSource for ActionCommands {
    fn next_command(&mut self) -> Option<SimCommand> {
        self.queue.pop_front()
    }
}

/// The render camera plus the free-look controller that takes it over.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: SceneCamera,
    pub free_look: FreeLook,
}

impl CameraRig {
    #[must_use]
    pub fn new(camera: SceneCamera, free_look: FreeLook) -> Self {
        Self { camera, free_look }
    }
}

impl PoseSink for CameraRig {
    fn apply_pose(&mut self, pose: &CameraPose) {
        self.camera.set_pose(pose.position, pose.forward(), pose.up());
    }

    fn begin_free_look(&mut self, pose: &CameraPose) {
        self.free_look.activate(pose);
    }

    fn end_free_look(&mut self) {
        self.free_look.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use orrery_input::{ActionResolver, InputMap, KeyboardState, MouseState, RawKeyEvent};
    use orrery_sim::{FixedDelta, SimSettings, Simulation};
    use winit::event::ElementState;
    use winit::keyboard::{KeyCode, PhysicalKey};

    fn press(kb: &mut KeyboardState, code: KeyCode) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        });
    }

    fn actions_for(kb: &KeyboardState) -> ActionState {
        let mut state = ActionState::new();
        ActionResolver::resolve(&InputMap::default(), kb, &MouseState::new(), &mut state);
        state
    }

    fn rig() -> CameraRig {
        CameraRig::new(SceneCamera::default(), FreeLook::new(0.2, 10.0))
    }

    #[test]
    fn test_one_shot_actions_become_commands() {
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::Space);
        press(&mut kb, KeyCode::ArrowUp);

        let mut commands = ActionCommands::new();
        commands.collect(&actions_for(&kb), 0.0);
        assert_eq!(commands.next_command(), Some(SimCommand::TogglePause));
        assert_eq!(commands.next_command(), Some(SimCommand::SpeedUp));
        assert_eq!(commands.next_command(), None);
    }

    #[test]
    fn test_held_movement_is_not_a_command() {
        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::KeyW);
        let mut commands = ActionCommands::new();
        commands.collect(&actions_for(&kb), 0.0);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_scroll_becomes_dolly() {
        let mut commands = ActionCommands::new();
        commands.collect(&ActionState::new(), -2.0);
        assert_eq!(commands.next_command(), Some(SimCommand::Dolly(-2.0)));
    }

    #[test]
    fn test_rig_follows_pose() {
        let mut rig = rig();
        let pose = CameraPose::new(Vec3::new(0.0, 50.0, 0.0), Vec3::new(90.0, 0.0, 0.0));
        rig.apply_pose(&pose);
        assert_eq!(rig.camera.eye, pose.position);
        assert!(rig.camera.forward.abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn test_restart_ends_free_look() {
        let mut sim = Simulation::new(SimSettings::default());
        let mut rig = rig();
        let mut commands = ActionCommands::new();

        for _ in 0..2000 {
            sim.frame(&mut FixedDelta(0.05), &mut commands, &mut rig);
            if rig.free_look.is_active() {
                break;
            }
        }
        assert!(rig.free_look.is_active());

        let mut kb = KeyboardState::new();
        press(&mut kb, KeyCode::Escape);
        commands.collect(&actions_for(&kb), 0.0);
        sim.frame(&mut FixedDelta(0.05), &mut commands, &mut rig);

        assert!(!rig.free_look.is_active());
        assert!(sim.director().is_running());
    }
}
