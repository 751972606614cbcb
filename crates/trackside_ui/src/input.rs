//! Input events.
//!
//! The host converts its window events into [`InputEvent`]s and hands them
//! to the [`crate::InputRouter`]. Events are immutable and passed by
//! reference through the bubble chain.

#![allow(missing_docs)]

use crate::node::NodeId;
use trackside_shared::PilotId;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    /// Alphabetic keys.
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    /// More alphabetic keys.
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    /// Number keys.
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    /// Function keys.
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Control key is held.
    pub ctrl: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Super/Command key is held.
    pub super_key: bool,
}

/// Button state carried by a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Button went down.
    Pressed,
    /// Button went up.
    Released,
    /// Pointer moved; no button change.
    Moved,
}

/// Mouse event in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub x: f32,
    pub y: f32,
    /// None for plain moves.
    pub button: Option<MouseButton>,
    pub state: ButtonState,
    pub modifiers: Modifiers,
    /// Click count for presses (2 = double click). Filled in by the router.
    pub clicks: u8,
}

impl MouseEvent {
    /// Button press.
    #[must_use]
    pub fn pressed(x: f32, y: f32, button: MouseButton) -> Self {
        Self {
            x,
            y,
            button: Some(button),
            state: ButtonState::Pressed,
            modifiers: Modifiers::default(),
            clicks: 1,
        }
    }

    /// Button release.
    #[must_use]
    pub fn released(x: f32, y: f32, button: MouseButton) -> Self {
        Self {
            state: ButtonState::Released,
            clicks: 0,
            ..Self::pressed(x, y, button)
        }
    }

    /// Pointer move.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: None,
            state: ButtonState::Moved,
            modifiers: Modifiers::default(),
            clicks: 0,
        }
    }

    /// Returns true for a left-button press.
    #[must_use]
    pub fn is_left_press(&self) -> bool {
        self.state == ButtonState::Pressed && self.button == Some(MouseButton::Left)
    }

    /// Returns true for a double click.
    #[must_use]
    pub fn is_double_click(&self) -> bool {
        self.state == ButtonState::Pressed && self.clicks >= 2
    }
}

/// Keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// False for releases.
    pub pressed: bool,
}

impl KeyEvent {
    /// Key press without modifiers.
    #[must_use]
    pub fn press(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            pressed: true,
        }
    }

    /// Key release without modifiers.
    #[must_use]
    pub fn release(key: Key) -> Self {
        Self {
            pressed: false,
            ..Self::press(key)
        }
    }
}

/// Any input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Mouse(MouseEvent),
    Key(KeyEvent),
}

impl From<MouseEvent> for InputEvent {
    fn from(event: MouseEvent) -> Self {
        Self::Mouse(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

/// What a dragged node offers to drop targets.
///
/// Drop targets query capabilities instead of inspecting the source's type.
pub trait DragPayload {
    /// Short human-readable description.
    fn label(&self) -> &str;

    /// The pilot this payload represents, if any.
    fn pilot(&self) -> Option<PilotId> {
        None
    }
}

/// A drop delivered to a candidate target.
pub struct DropEvent<'a> {
    /// The dragged node.
    pub source: NodeId,
    /// Capabilities of the dragged node.
    pub payload: &'a dyn DragPayload,
    pub x: f32,
    pub y: f32,
}

impl std::fmt::Debug for DropEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropEvent")
            .field("source", &self.source)
            .field("payload", &self.payload.label())
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

/// Result of routing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A node reported the event handled.
    Handled(NodeId),
    /// Nobody handled it.
    Ignored,
    /// A drag ended on a target that accepted it.
    Dropped {
        source: NodeId,
        target: NodeId,
    },
    /// A drag ended and no target accepted it.
    DropRejected {
        source: NodeId,
    },
    /// A drag was cancelled (Escape, or the source was disposed).
    DragCancelled {
        source: NodeId,
    },
}
