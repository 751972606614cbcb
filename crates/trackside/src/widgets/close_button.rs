//! Close badge that disposes the card it sits on.

use trackside_ui::{
    Color, DrawContext, EventContext, EventOutcome, MouseEvent, NodeId, NodeTree, Rect, Sizing,
    Theme, TreeResult, Widget,
};

/// Badge size in pixels.
const BADGE_SIZE: f32 = 20.0;

/// Disposes `target` on a left click.
///
/// The target is usually the badge's own parent; disposing an ancestor from
/// inside its own event handler is safe, removal is deferred until dispatch
/// unwinds.
#[derive(Debug, Clone)]
pub struct CloseButton {
    target: NodeId,
    fill: Color,
    hover_fill: Color,
    glyph: Color,
    hovered: bool,
}

impl CloseButton {
    /// Creates a badge that closes `target`.
    #[must_use]
    pub fn new(target: NodeId, theme: &Theme) -> Self {
        Self {
            target,
            fill: theme.surface,
            hover_fill: theme.warning,
            glyph: theme.text,
            hovered: false,
        }
    }

    /// Builds a badge straddling the top-right corner of `card`.
    ///
    /// The badge pokes out past the card's bounds and still receives clicks.
    ///
    /// # Errors
    ///
    /// Fails if `card` has been disposed.
    pub fn attach(tree: &mut NodeTree, card: NodeId, theme: &Theme) -> TreeResult<NodeId> {
        let card_width = tree.absolute_bounds(card).map_or(0.0, |b| b.width);
        // Centre the badge on the corner when the card has been laid out.
        let x = if card_width > 0.0 {
            1.0 - (BADGE_SIZE / 2.0) / card_width
        } else {
            1.0
        };
        let card_height = tree.absolute_bounds(card).map_or(0.0, |b| b.height);
        let y = if card_height > 0.0 {
            -(BADGE_SIZE / 2.0) / card_height
        } else {
            0.0
        };

        let badge = tree.create_with(
            Self::new(card, theme),
            Rect::new(x, y, 0.0, 0.0),
            Sizing::Fixed {
                width: BADGE_SIZE,
                height: BADGE_SIZE,
            },
        );
        if let Err(err) = tree.add_child(card, badge) {
            tree.dispose(badge);
            return Err(err);
        }
        Ok(badge)
    }

    /// Node this badge closes.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }
}

impl Widget for CloseButton {
    fn name(&self) -> &'static str {
        "close_button"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        let fill = if self.hovered { self.hover_fill } else { self.fill };
        ctx.fill_rect(bounds, fill, bounds.width / 2.0);
        ctx.text_at("x", bounds.x + bounds.width * 0.3, bounds.y, self.glyph, bounds.height * 0.8);
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut EventContext<'_>) -> EventOutcome {
        if !event.is_left_press() {
            return EventOutcome::Ignore;
        }
        tracing::debug!(target_node = ?self.target, "close clicked");
        ctx.dispose(self.target);
        EventOutcome::Handle
    }

    fn on_hover(&mut self, hovered: bool) {
        self.hovered = hovered;
    }
}
