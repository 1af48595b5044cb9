//! Input event types fed to the gesture machine.
//!
//! The presentation surface translates toolkit events into these. Pointer events
//! always refer to the primary button.

use crate::geometry::Point;

/// Modifier keys held while an event happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift arms slide dragging in editor mode.
    pub shift: bool,
    /// Command on macOS, Ctrl elsewhere. Arms camera panning.
    pub command: bool,
}

/// Keys the machine reacts to. The surface drops every other key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Enter,
    ArrowRight,
    Backspace,
    ArrowLeft,
    N,
    M,
    Escape,
}

/// What a key means to the presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Next,
    Previous,
    ZoomOut,
    ZoomIn,
    Escape,
}

impl Key {
    pub fn action(self) -> KeyAction {
        match self {
            Key::Space | Key::Enter | Key::ArrowRight => KeyAction::Next,
            Key::Backspace | Key::ArrowLeft => KeyAction::Previous,
            Key::N => KeyAction::ZoomOut,
            Key::M => KeyAction::ZoomIn,
            Key::Escape => KeyAction::Escape,
        }
    }
}

/// A single input event. `time` is seconds on the surface's monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),
    PointerDown { pos: Point, time: f64 },
    PointerMoved { pos: Point, time: f64 },
    PointerUp { pos: Point },
    /// Vertical scroll in points, positive when scrolling up.
    Wheel { delta_y: f64 },
    KeyDown(Key),
}
