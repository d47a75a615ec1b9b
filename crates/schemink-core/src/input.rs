//! Input events delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Multi-select: clicks toggle selection membership.
    pub shift: bool,
    pub ctrl: bool,
}

/// Pointer event in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Shift,
    Control,
    Space,
    A,
    Z,
    Y,
    C,
    V,
    Other(i32),
}

impl Key {
    /// Map a host key code. Special keys use the `0x0100_00xx` range,
    /// letters their upper-case ASCII code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0x0100_0007 => Key::Delete,
            0x0100_0020 => Key::Shift,
            0x0100_0021 => Key::Control,
            0x20 => Key::Space,
            0x41 => Key::A,
            0x5a => Key::Z,
            0x59 => Key::Y,
            0x43 => Key::C,
            0x56 => Key::V,
            other => Key::Other(other),
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(Key),
    Released(Key),
}

impl KeyEvent {
    pub fn pressed(code: i32) -> Self {
        KeyEvent::Pressed(Key::from_code(code))
    }

    pub fn released(code: i32) -> Self {
        KeyEvent::Released(Key::from_code(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code(16777223), Key::Delete);
        assert_eq!(Key::from_code(16777248), Key::Shift);
        assert_eq!(Key::from_code(16777249), Key::Control);
        assert_eq!(Key::from_code(32), Key::Space);
        assert_eq!(Key::from_code(65), Key::A);
        assert_eq!(Key::from_code(90), Key::Z);
        assert_eq!(Key::from_code(89), Key::Y);
        assert_eq!(Key::from_code(67), Key::C);
        assert_eq!(Key::from_code(86), Key::V);
        assert_eq!(Key::from_code(97), Key::Other(97));
    }

    #[test]
    fn test_key_event_helpers() {
        assert_eq!(KeyEvent::pressed(32), KeyEvent::Pressed(Key::Space));
        assert_eq!(KeyEvent::released(16777248), KeyEvent::Released(Key::Shift));
    }
}
