//! Frame-coherent mouse state: cursor motion, buttons and the scroll wheel.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scrolling treated as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
        MouseButton::Back | MouseButton::Forward | MouseButton::Other(_) => 3,
    }
}

/// Mouse state accumulated between two calls to
/// [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Vec2,
    delta: Vec2,
    buttons: [ButtonFrame; 4],
    scroll: f32,
    cursor_in_window: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Event handlers ──────────────────────────────────────────────

    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if self.cursor_in_window {
            self.delta += new_pos - self.position;
        }
        self.position = new_pos;
        self.cursor_in_window = true;
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let b = &mut self.buttons[button_index(button)];
        match state {
            ElementState::Pressed => {
                b.pressed = true;
                b.just_pressed = true;
            }
            ElementState::Released => {
                b.pressed = false;
                b.just_released = true;
            }
        }
    }

    /// Wheel input in notches; positive scrolls up (away from the user).
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_NOTCH) as f32,
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    /// The next `CursorMoved` after re-entry must not produce a jump.
    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
    }

    /// Drop held buttons, e.g. on focus loss.
    pub fn release_all(&mut self) {
        for b in &mut self.buttons {
            if b.pressed {
                b.pressed = false;
                b.just_released = true;
            }
        }
    }

    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
        for b in &mut self.buttons {
            b.just_pressed = false;
            b.just_released = false;
        }
    }

    // ── Queries ─────────────────────────────────────────────────────

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Cursor movement this frame, in logical pixels.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Cursor movement this frame while `button` is held, zero otherwise.
    #[must_use]
    pub fn drag_delta(&self, button: MouseButton) -> Vec2 {
        if self.is_button_pressed(button) {
            self.delta
        } else {
            Vec2::ZERO
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].pressed
    }

    #[must_use]
    pub fn just_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_pressed
    }

    #[must_use]
    pub fn just_button_released(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)].just_released
    }

    /// Scroll notches accumulated this frame (positive = scroll up).
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_first_move_has_no_delta() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        assert_eq!(ms.position(), Vec2::new(100.0, 200.0));
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_delta_between_moves() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(100.0, 200.0);
        ms.clear_transients();
        ms.on_cursor_moved(110.0, 195.0);
        assert_eq!(ms.delta(), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_drag_delta_requires_button() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(0.0, 0.0);
        ms.on_cursor_moved(4.0, 3.0);
        assert_eq!(ms.drag_delta(MouseButton::Left), Vec2::ZERO);

        ms.on_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(ms.drag_delta(MouseButton::Left), Vec2::new(4.0, 3.0));
        assert_eq!(ms.drag_delta(MouseButton::Right), Vec2::ZERO);
    }

    #[test]
    fn test_reentry_does_not_jump() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(10.0, 10.0);
        ms.on_cursor_left();
        ms.on_cursor_moved(500.0, 400.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_button_press_and_release_tracked() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(ms.is_button_pressed(MouseButton::Left));
        assert!(ms.just_button_pressed(MouseButton::Left));

        ms.on_button(MouseButton::Left, ElementState::Released);
        assert!(!ms.is_button_pressed(MouseButton::Left));
        assert!(ms.just_button_released(MouseButton::Left));
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        ms.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -20.0)));
        assert!((ms.scroll() - 0.5).abs() < f32::EPSILON);
        ms.clear_transients();
        assert_eq!(ms.scroll(), 0.0);
    }

    #[test]
    fn test_release_all_buttons() {
        let mut ms = MouseState::new();
        ms.on_button(MouseButton::Left, ElementState::Pressed);
        ms.clear_transients();
        ms.release_all();
        assert!(!ms.is_button_pressed(MouseButton::Left));
        assert!(ms.just_button_released(MouseButton::Left));
    }
}
