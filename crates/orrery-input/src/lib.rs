//! Keyboard and mouse state mapped to orrery actions through rebindable,
//! RON-persisted keybindings.

pub mod action_map;
pub mod keybindings;
pub mod keyboard;
pub mod mouse;

pub use action_map::{Action, ActionResolver, ActionState, InputBinding, InputMap, MouseButtonBinding};
pub use keybindings::{Conflict, KEYBINDINGS_FILE, KeybindingError};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
