//! Core widget trait.

use super::context::{DrawContext, EventContext, UpdateContext};
use crate::input::{DragPayload, DropEvent, KeyEvent, MouseEvent};

/// Whether a handler consumed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Stop bubbling.
    Handle,
    /// Pass to the parent.
    Ignore,
}

/// Behaviour of a node.
///
/// Every method has a no-op default, so a widget only implements what it
/// needs.
pub trait Widget: 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        "widget"
    }

    /// Per-frame state refresh. Runs after animations advance.
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {}

    /// Emits draw calls for this node only; children are drawn afterwards.
    fn draw(&mut self, _ctx: &mut DrawContext<'_>) {}

    /// Mouse event bubbled from the hit leaf.
    fn on_mouse(&mut self, _event: &MouseEvent, _ctx: &mut EventContext<'_>) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Keyboard event. Only delivered to the focus node.
    fn on_key(&mut self, _event: &KeyEvent, _ctx: &mut EventContext<'_>) -> EventOutcome {
        EventOutcome::Ignore
    }

    /// Pointer entered (`true`) or left (`false`) this node.
    fn on_hover(&mut self, _hovered: bool) {}

    /// Focus gained or lost.
    fn on_focus(&mut self, _focused: bool) {}

    /// Payload offered when a drag starts on this node.
    fn drag_payload(&self) -> Option<Box<dyn DragPayload>> {
        None
    }

    /// A drag was released over this node. Returns true to accept it.
    fn on_drop(&mut self, _event: &DropEvent<'_>, _ctx: &mut EventContext<'_>) -> bool {
        false
    }

    /// Last call before the widget is dropped.
    fn on_dispose(&mut self) {}
}

/// Plain container with no behaviour of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Group;

impl Widget for Group {
    fn name(&self) -> &'static str {
        "group"
    }
}
