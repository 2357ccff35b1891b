//! Input payloads carried by `KEY`, `MOUSE` and `RESIZE` messages.
//!
//! These are backend-neutral: whatever terminal or window library decodes
//! raw input converts into these before publishing.

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Esc,
    /// Function key F1..=F12.
    F(u8),
    Char(char),
    Enter,
    /// Any other key, identified by the backend's own code.
    Other(u16),
}

/// Mouse buttons and wheel directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Release,
    WheelUp,
    WheelDown,
}

/// A mouse event at a cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub x: i32,
    pub y: i32,
}

/// Width/height pair carried by a resize message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
