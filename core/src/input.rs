//! Platform-agnostic input types.
//!
//! The host polls its windowing layer once per frame and hands the overlay an
//! [`InputState`]. [`InputSnapshot`] is a plain value implementation of it,
//! suitable for hosts that copy input out of their event loop and for tests.

use std::collections::HashSet;

use crate::math::Vec2;

/// Physical keyboard key identifier.
///
/// Only the keys the overlay reacts to are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyCode {
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Per-frame view of mouse and keyboard state.
pub trait InputState {
    /// Whether a mouse is attached at all.
    fn has_mouse(&self) -> bool {
        true
    }

    /// Cursor position in normalized screen space: `(0, 0)` top-left, `(1, 1)` bottom-right.
    fn mouse_position(&self) -> Vec2;

    /// The button went down this frame.
    fn is_mouse_pressed(&self, button: MouseButton) -> bool;

    /// The button went up this frame.
    fn is_mouse_released(&self, button: MouseButton) -> bool;

    /// The button is currently held.
    fn is_mouse_down(&self, button: MouseButton) -> bool;

    /// The key is currently held.
    fn is_key_down(&self, key: KeyCode) -> bool;

    fn is_shift_down(&self) -> bool {
        self.is_key_down(KeyCode::ShiftLeft) || self.is_key_down(KeyCode::ShiftRight)
    }
}

/// Owned input state for a single frame.
#[derive(Debug, Clone)]
pub struct InputSnapshot {
    pub has_mouse: bool,
    pub mouse_position: Vec2,
    pub pressed: HashSet<MouseButton>,
    pub released: HashSet<MouseButton>,
    pub down: HashSet<MouseButton>,
    pub keys_down: HashSet<KeyCode>,
}

impl InputSnapshot {
    /// Mouse at `position` with nothing pressed.
    pub fn at(position: Vec2) -> Self {
        Self {
            has_mouse: true,
            mouse_position: position,
            pressed: HashSet::new(),
            released: HashSet::new(),
            down: HashSet::new(),
            keys_down: HashSet::new(),
        }
    }

    /// Build the next frame's snapshot: edges are cleared, held state is kept.
    pub fn next_frame(&self, position: Vec2) -> Self {
        Self {
            has_mouse: self.has_mouse,
            mouse_position: position,
            pressed: HashSet::new(),
            released: HashSet::new(),
            down: self.down.clone(),
            keys_down: self.keys_down.clone(),
        }
    }

    pub fn press(mut self, button: MouseButton) -> Self {
        self.pressed.insert(button);
        self.down.insert(button);
        self
    }

    pub fn release(mut self, button: MouseButton) -> Self {
        self.released.insert(button);
        self.down.remove(&button);
        self
    }

    pub fn with_key(mut self, key: KeyCode) -> Self {
        self.keys_down.insert(key);
        self
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::at(Vec2::new(0.5, 0.5))
    }
}

impl InputState for InputSnapshot {
    fn has_mouse(&self) -> bool {
        self.has_mouse
    }

    fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    fn is_mouse_released(&self, button: MouseButton) -> bool {
        self.released.contains(&button)
    }

    fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.down.contains(&button)
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }
}
