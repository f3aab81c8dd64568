//! Actions and the table that binds them to keys and mouse buttons.
//!
//! [`InputMap`] says which physical inputs trigger which [`Action`].
//! [`ActionResolver`] turns the current keyboard and mouse state into an
//! [`ActionState`] once per frame, remembering the previous frame so that
//! one-shot actions (pause, speed steps, restart) fire on the press edge only.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;

/// [`KeyCode`] has no serde support; keys are stored by variant name.
mod keycode_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use winit::keyboard::KeyCode;

    macro_rules! key_names {
        ($($name:ident),* $(,)?) => {
            fn to_name(code: KeyCode) -> Option<&'static str> {
                match code {
                    $(KeyCode::$name => Some(stringify!($name)),)*
                    _ => None,
                }
            }

            fn from_name(name: &str) -> Option<KeyCode> {
                match name {
                    $(stringify!($name) => Some(KeyCode::$name),)*
                    _ => None,
                }
            }
        };
    }

    key_names!(
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
        KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ, Digit0, Digit1,
        Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Space, Enter, Escape,
        Tab, Backspace, ShiftLeft, ShiftRight, ControlLeft, ControlRight, AltLeft, AltRight,
        ArrowUp, ArrowDown, ArrowLeft, ArrowRight, PageUp, PageDown, Home, End, Equal, Minus,
        NumpadAdd, NumpadSubtract, F1, F2, F3, F4, F5,
    );

    pub fn serialize<S: Serializer>(code: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        to_name(*code)
            .ok_or_else(|| serde::ser::Error::custom(format!("unsupported key: {code:?}")))?
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        from_name(&name).ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }
}

/// Everything the user can ask the orrery to do.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Action {
    /// Freeze or resume the simulation.
    TogglePause,
    /// Multiply the simulation speed by the speed step.
    SpeedUp,
    /// Divide the simulation speed by the speed step.
    SlowDown,
    /// Re-initialize everything.
    Restart,
    /// While held, mouse motion turns the free-look camera.
    Look,
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
}

impl Action {
    /// Actions that fire once per press rather than while held.
    pub const ONE_SHOT: [Action; 4] = [
        Action::TogglePause,
        Action::SpeedUp,
        Action::SlowDown,
        Action::Restart,
    ];
}

/// Serde-friendly mirror of [`winit::event::MouseButton`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MouseButtonBinding {
    Left,
    Right,
    Middle,
}

impl MouseButtonBinding {
    #[must_use]
    pub fn to_winit(self) -> MouseButton {
        match self {
            Self::Left => MouseButton::Left,
            Self::Right => MouseButton::Right,
            Self::Middle => MouseButton::Middle,
        }
    }
}

/// A physical input that can trigger an action.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum InputBinding {
    Key(#[serde(with = "keycode_serde")] KeyCode),
    MouseButton(MouseButtonBinding),
}

/// Maps each [`Action`] to any number of [`InputBinding`]s (OR logic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMap {
    pub bindings: HashMap<Action, Vec<InputBinding>>,
}

impl Default for InputMap {
    /// Space pauses, the up/down arrows change speed, Escape restarts,
    /// left-drag looks around and WASD/E/Q fly the free-look camera.
    fn default() -> Self {
        use InputBinding::Key;

        let bindings = HashMap::from([
            (Action::TogglePause, vec![Key(KeyCode::Space)]),
            (Action::SpeedUp, vec![Key(KeyCode::ArrowUp)]),
            (Action::SlowDown, vec![Key(KeyCode::ArrowDown)]),
            (Action::Restart, vec![Key(KeyCode::Escape)]),
            (
                Action::Look,
                vec![InputBinding::MouseButton(MouseButtonBinding::Left)],
            ),
            (Action::MoveForward, vec![Key(KeyCode::KeyW)]),
            (Action::MoveBackward, vec![Key(KeyCode::KeyS)]),
            (Action::MoveLeft, vec![Key(KeyCode::KeyA)]),
            (Action::MoveRight, vec![Key(KeyCode::KeyD)]),
            (Action::MoveUp, vec![Key(KeyCode::KeyE)]),
            (Action::MoveDown, vec![Key(KeyCode::KeyQ)]),
        ]);
        Self { bindings }
    }
}

impl InputMap {
    /// A map with no bindings at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Replace the bindings for an action.
    pub fn set_bindings(&mut self, action: Action, bindings: Vec<InputBinding>) {
        self.bindings.insert(action, bindings);
    }

    #[must_use]
    pub fn get_bindings(&self, action: Action) -> &[InputBinding] {
        self.bindings.get(&action).map_or(&[], Vec::as_slice)
    }

    /// # Errors
    /// Fails if a bound key has no stable name.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// # Errors
    /// Fails on malformed RON or unknown key names.
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// Which actions are held this frame and which were held last frame.
#[derive(Debug, Clone, Default)]
pub struct ActionState {
    active: HashSet<Action>,
    previous: HashSet<Action>,
    /// Actions whose binding saw a new press this frame, even if it was
    /// released again before the frame was resolved.
    pressed_this_frame: HashSet<Action>,
}

impl ActionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_action_active(&self, action: Action) -> bool {
        self.active.contains(&action)
    }

    /// True only on the frame the action went from inactive to active, or
    /// was tapped within the frame.
    #[must_use]
    pub fn action_just_activated(&self, action: Action) -> bool {
        (self.active.contains(&action) && !self.previous.contains(&action))
            || self.pressed_this_frame.contains(&action)
    }

    #[must_use]
    pub fn action_just_deactivated(&self, action: Action) -> bool {
        !self.active.contains(&action) && self.previous.contains(&action)
    }

    /// `+1` if only `positive` is held, `-1` if only `negative` is, else 0.
    #[must_use]
    pub fn axis(&self, positive: Action, negative: Action) -> f32 {
        let p = if self.is_action_active(positive) { 1.0 } else { 0.0 };
        let n = if self.is_action_active(negative) { 1.0 } else { 0.0 };
        p - n
    }

    /// One-shot actions that fired this frame, in a stable order.
    pub fn just_activated(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ONE_SHOT
            .into_iter()
            .filter(|a| self.action_just_activated(*a))
    }
}

/// Computes [`ActionState`] from raw device state.
pub struct ActionResolver;

impl ActionResolver {
    /// Call once per frame after all input events for the frame arrived.
    pub fn resolve(
        input_map: &InputMap,
        keyboard: &KeyboardState,
        mouse: &MouseState,
        state: &mut ActionState,
    ) {
        state.previous = std::mem::take(&mut state.active);
        state.pressed_this_frame.clear();

        for (action, bindings) in &input_map.bindings {
            if bindings
                .iter()
                .any(|b| Self::is_binding_held(b, keyboard, mouse))
            {
                state.active.insert(*action);
            }
            if bindings
                .iter()
                .any(|b| Self::is_binding_just_pressed(b, keyboard, mouse))
            {
                state.pressed_this_frame.insert(*action);
            }
        }
    }

    fn is_binding_just_pressed(
        binding: &InputBinding,
        keyboard: &KeyboardState,
        mouse: &MouseState,
    ) -> bool {
        match binding {
            InputBinding::Key(code) => keyboard.just_pressed(PhysicalKey::Code(*code)),
            InputBinding::MouseButton(btn) => mouse.just_button_pressed(btn.to_winit()),
        }
    }

    fn is_binding_held(binding: &InputBinding, keyboard: &KeyboardState, mouse: &MouseState) -> bool {
        match binding {
            InputBinding::Key(code) => keyboard.is_pressed(PhysicalKey::Code(*code)),
            InputBinding::MouseButton(btn) => mouse.is_button_pressed(btn.to_winit()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::RawKeyEvent;
    use winit::event::ElementState;

    fn key(kb: &mut KeyboardState, code: KeyCode, state: ElementState) {
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat: false,
        });
    }

    fn resolve(map: &InputMap, kb: &KeyboardState, mouse: &MouseState, state: &mut ActionState) {
        ActionResolver::resolve(map, kb, mouse, state);
    }

    #[test]
    fn test_default_bindings_cover_controls() {
        let map = InputMap::default();
        assert_eq!(
            map.get_bindings(Action::TogglePause),
            [InputBinding::Key(KeyCode::Space)]
        );
        assert_eq!(
            map.get_bindings(Action::SpeedUp),
            [InputBinding::Key(KeyCode::ArrowUp)]
        );
        assert_eq!(
            map.get_bindings(Action::SlowDown),
            [InputBinding::Key(KeyCode::ArrowDown)]
        );
        assert_eq!(
            map.get_bindings(Action::Restart),
            [InputBinding::Key(KeyCode::Escape)]
        );
    }

    #[test]
    fn test_pause_fires_once_per_press() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        key(&mut kb, KeyCode::Space, ElementState::Pressed);
        resolve(&map, &kb, &mouse, &mut state);
        assert_eq!(state.just_activated().collect::<Vec<_>>(), [Action::TogglePause]);
        kb.clear_transients();

        resolve(&map, &kb, &mouse, &mut state);
        assert!(state.is_action_active(Action::TogglePause));
        assert_eq!(state.just_activated().count(), 0);

        key(&mut kb, KeyCode::Space, ElementState::Released);
        resolve(&map, &kb, &mouse, &mut state);
        assert!(state.action_just_deactivated(Action::TogglePause));
    }

    #[test]
    fn test_tap_within_one_frame_fires() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        key(&mut kb, KeyCode::ArrowUp, ElementState::Pressed);
        key(&mut kb, KeyCode::ArrowUp, ElementState::Released);
        resolve(&map, &kb, &mouse, &mut state);
        assert!(!state.is_action_active(Action::SpeedUp));
        assert_eq!(state.just_activated().collect::<Vec<_>>(), [Action::SpeedUp]);

        kb.clear_transients();
        resolve(&map, &kb, &mouse, &mut state);
        assert_eq!(state.just_activated().count(), 0);
    }

    #[test]
    fn test_look_bound_to_left_button() {
        let map = InputMap::default();
        let kb = KeyboardState::new();
        let mut mouse = MouseState::new();
        let mut state = ActionState::new();

        mouse.on_button(MouseButton::Left, ElementState::Pressed);
        resolve(&map, &kb, &mouse, &mut state);
        assert!(state.is_action_active(Action::Look));
    }

    #[test]
    fn test_axis_cancels_opposites() {
        let map = InputMap::default();
        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        key(&mut kb, KeyCode::KeyW, ElementState::Pressed);
        resolve(&map, &kb, &mouse, &mut state);
        assert_eq!(state.axis(Action::MoveForward, Action::MoveBackward), 1.0);

        key(&mut kb, KeyCode::KeyS, ElementState::Pressed);
        resolve(&map, &kb, &mouse, &mut state);
        assert_eq!(state.axis(Action::MoveForward, Action::MoveBackward), 0.0);
    }

    #[test]
    fn test_rebinding_at_runtime() {
        let mut map = InputMap::default();
        map.set_bindings(Action::Restart, vec![InputBinding::Key(KeyCode::KeyR)]);

        let mut kb = KeyboardState::new();
        let mouse = MouseState::new();
        let mut state = ActionState::new();

        key(&mut kb, KeyCode::Escape, ElementState::Pressed);
        resolve(&map, &kb, &mouse, &mut state);
        assert!(!state.is_action_active(Action::Restart));

        key(&mut kb, KeyCode::KeyR, ElementState::Pressed);
        resolve(&map, &kb, &mouse, &mut state);
        assert!(state.action_just_activated(Action::Restart));
    }

    #[test]
    fn test_unbound_action_inactive() {
        let map = InputMap::empty();
        let mut kb = KeyboardState::new();
        key(&mut kb, KeyCode::Space, ElementState::Pressed);
        let mut state = ActionState::new();
        resolve(&map, &kb, &MouseState::new(), &mut state);
        assert!(!state.is_action_active(Action::TogglePause));
    }

    #[test]
    fn test_unknown_key_name_rejected() {
        let result = InputMap::from_ron("(bindings: { TogglePause: [Key(\"NotAKey\")] })");
        assert!(result.is_err());
    }
}
