//! Pilot chips and the slots they are dragged into.
//!
//! A chip offers a [`PilotPayload`] when a drag starts on it. A slot accepts
//! any payload that carries a pilot, and nothing else.

use crossbeam_channel::Sender;
use trackside_shared::PilotId;
use trackside_ui::{
    Animation, Color, DragPayload, DrawContext, DropEvent, Easing, EventContext, NodeId, Theme,
    UpdateContext, Widget,
};

/// Hover highlight runs this much faster than wall time.
const HOVER_SPEED: f32 = 8.0;

/// Drag payload for a pilot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotPayload {
    /// The pilot.
    pub pilot: PilotId,
    /// Display name.
    pub name: String,
}

impl DragPayload for PilotPayload {
    fn label(&self) -> &str {
        &self.name
    }

    fn pilot(&self) -> Option<PilotId> {
        Some(self.pilot)
    }
}

/// Draggable pilot name card.
#[derive(Debug, Clone)]
pub struct PilotChip {
    pilot: PilotId,
    name: String,
    fill: Color,
    accent: Color,
    text: Color,
    hover: Animation,
}

impl PilotChip {
    /// Creates a chip.
    #[must_use]
    pub fn new(pilot: PilotId, name: impl Into<String>, theme: &Theme) -> Self {
        Self {
            pilot,
            name: name.into(),
            fill: theme.surface,
            accent: theme.primary,
            text: theme.text,
            hover: Animation::new(0.0, Easing::ExponentialOut),
        }
    }

    /// The pilot on this chip.
    #[must_use]
    pub fn pilot(&self) -> PilotId {
        self.pilot
    }
}

impl Widget for PilotChip {
    fn name(&self) -> &'static str {
        "pilot_chip"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.hover.is_complete() {
            return;
        }
        self.hover.update(ctx.dt() * HOVER_SPEED);
        ctx.request_redraw();
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        let t = self.hover.value();
        ctx.fill_rect(bounds, self.fill.lerp(self.accent, t * 0.25), 3.0);
        ctx.outline(self.accent.with_alpha(0.4 + t * 0.6), 1.0 + t);
        ctx.text_at(&self.name, bounds.x + 6.0, bounds.y + 4.0, self.text, 14.0);
    }

    fn on_hover(&mut self, hovered: bool) {
        self.hover.set_target(if hovered { 1.0 } else { 0.0 });
    }

    fn drag_payload(&self) -> Option<Box<dyn DragPayload>> {
        Some(Box::new(PilotPayload {
            pilot: self.pilot,
            name: self.name.clone(),
        }))
    }
}

/// A pilot landed in a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAssignment {
    /// The slot node.
    pub slot: NodeId,
    /// Position of the slot on its board.
    pub index: usize,
    /// Assigned pilot.
    pub pilot: PilotId,
    /// Pilot display name.
    pub name: String,
}

/// Drop target holding at most one pilot.
#[derive(Debug)]
pub struct PilotSlot {
    index: usize,
    assigned: Option<(PilotId, String)>,
    assignments: Option<Sender<SlotAssignment>>,
    hovered: bool,
    fill: Color,
    highlight: Color,
    border: Color,
    text: Color,
    placeholder: Color,
}

impl PilotSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new(index: usize, theme: &Theme) -> Self {
        Self {
            index,
            assigned: None,
            assignments: None,
            hovered: false,
            fill: theme.surface,
            highlight: theme.drop_target,
            border: theme.border,
            text: theme.text,
            placeholder: theme.text_muted,
        }
    }

    /// Reports every accepted drop on `sender`.
    #[must_use]
    pub fn with_assignments(mut self, sender: Sender<SlotAssignment>) -> Self {
        self.assignments = Some(sender);
        self
    }

    /// The pilot currently in the slot.
    #[must_use]
    pub fn assigned(&self) -> Option<PilotId> {
        self.assigned.as_ref().map(|(pilot, _)| *pilot)
    }
}

impl Widget for PilotSlot {
    fn name(&self) -> &'static str {
        "pilot_slot"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        ctx.fill_rect(bounds, self.fill, 3.0);
        if self.hovered {
            ctx.fill_rect(bounds, self.highlight, 3.0);
        }
        ctx.outline(self.border, 1.0);

        let label = format!("{}.", self.index + 1);
        ctx.text_at(&label, bounds.x + 6.0, bounds.y + 4.0, self.placeholder, 14.0);
        match &self.assigned {
            Some((_, name)) => ctx.text_at(name, bounds.x + 32.0, bounds.y + 4.0, self.text, 14.0),
            None => ctx.text_at("empty", bounds.x + 32.0, bounds.y + 4.0, self.placeholder, 14.0),
        }
    }

    fn on_hover(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    fn on_drop(&mut self, event: &DropEvent<'_>, ctx: &mut EventContext<'_>) -> bool {
        let Some(pilot) = event.payload.pilot() else {
            return false;
        };
        let name = event.payload.label().to_string();
        tracing::debug!(slot = self.index, %pilot, "pilot assigned");

        if let Some(sender) = &self.assignments {
            let assignment = SlotAssignment {
                slot: ctx.node(),
                index: self.index,
                pilot,
                name: name.clone(),
            };
            if sender.send(assignment).is_err() {
                tracing::debug!(slot = self.index, "assignment receiver gone");
            }
        }
        self.assigned = Some((pilot, name));
        self.hovered = false;
        ctx.request_redraw();
        true
    }
}
