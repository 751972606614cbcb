//! Contexts handed to widget methods.

use super::tree::NodeTree;
use crate::layout::{self, Rect, Sizing};
use crate::node::NodeId;
use crate::render::Drawer;
use crate::style::Color;
use crate::texture::TextureSlot;
use trackside_shared::Subscription;

/// Draw-time view of one node.
///
/// Every color passed through here is multiplied by the node's effective
/// alpha before it reaches the drawer.
pub struct DrawContext<'a> {
    drawer: &'a mut dyn Drawer,
    node: NodeId,
    bounds: Rect,
    alpha: f32,
    focused: bool,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        drawer: &'a mut dyn Drawer,
        node: NodeId,
        bounds: Rect,
        alpha: f32,
        focused: bool,
    ) -> Self {
        Self {
            drawer,
            node,
            bounds,
            alpha,
            focused,
        }
    }

    /// The node being drawn.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Absolute bounds of the node.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Accumulated alpha (node alpha times every ancestor's).
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns true if this node holds focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Resolves a rectangle relative to this node's bounds.
    #[must_use]
    pub fn resolve(&self, relative: Rect) -> Rect {
        layout::resolve(self.bounds, relative, Sizing::Relative)
    }

    /// Fills the whole node.
    pub fn fill(&mut self, color: Color) {
        self.fill_rect(self.bounds, color, 0.0);
    }

    /// Fills an absolute rectangle.
    pub fn fill_rect(&mut self, bounds: Rect, color: Color, corner_radius: f32) {
        self.drawer
            .draw_rect(bounds, color.fade(self.alpha), corner_radius);
    }

    /// Outlines the whole node.
    pub fn outline(&mut self, color: Color, width: f32) {
        self.drawer
            .draw_outline(self.bounds, color.fade(self.alpha), width);
    }

    /// Draws text at the node's top-left corner.
    pub fn text(&mut self, text: &str, color: Color, font_size: f32) {
        self.text_at(text, self.bounds.x, self.bounds.y, color, font_size);
    }

    /// Draws text at an absolute position.
    pub fn text_at(&mut self, text: &str, x: f32, y: f32, color: Color, font_size: f32) {
        self.drawer
            .draw_text(text, x, y, color.fade(self.alpha), font_size);
    }

    /// Draws a lazily resolved texture over the whole node.
    ///
    /// Returns false (and draws nothing) while the texture is unavailable.
    pub fn texture(&mut self, slot: &mut TextureSlot, tint: Color) -> bool {
        let Some(handle) = slot.resolve(self.drawer.textures()) else {
            return false;
        };
        self.drawer
            .draw_texture(self.bounds, handle, tint.fade(self.alpha));
        true
    }

    /// Clips subsequent drawing to the node's bounds.
    pub fn push_clip(&mut self) {
        self.drawer.push_clip(self.bounds);
    }

    /// Pops the clip pushed by [`Self::push_clip`].
    pub fn pop_clip(&mut self) {
        self.drawer.pop_clip();
    }
}

/// Tree access while handling an input event.
pub struct EventContext<'a> {
    tree: &'a mut NodeTree,
    node: NodeId,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(tree: &'a mut NodeTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The node handling the event.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Absolute bounds of the handling node.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.tree.absolute_bounds(self.node).unwrap_or(Rect::ZERO)
    }

    /// Shared tree access.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &*self.tree
    }

    /// Mutable tree access. Structural removals are deferred until the
    /// dispatch finishes.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut *self.tree
    }

    /// Gives keyboard focus to the handling node.
    pub fn focus(&mut self) {
        self.tree.set_focus(Some(self.node));
    }

    /// Returns true if the handling node holds focus.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.tree.focus() == Some(self.node)
    }

    /// Disposes a node.
    pub fn dispose(&mut self, id: NodeId) {
        self.tree.dispose(id);
    }

    /// Marks the handling node for redraw.
    pub fn request_redraw(&mut self) {
        self.tree.request_redraw(self.node);
    }
}

/// Tree access during Update.
pub struct UpdateContext<'a> {
    tree: &'a mut NodeTree,
    node: NodeId,
    dt: f32,
}

impl<'a> UpdateContext<'a> {
    pub(crate) fn new(tree: &'a mut NodeTree, node: NodeId, dt: f32) -> Self {
        Self { tree, node, dt }
    }

    /// The node being updated.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Frame time in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Shared tree access.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &*self.tree
    }

    /// Mutable tree access.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut *self.tree
    }

    /// Children of the node being updated.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        self.tree.children(self.node).to_vec()
    }

    /// Marks the node for redraw.
    pub fn request_redraw(&mut self) {
        self.tree.request_redraw(self.node);
    }

    /// Marks the node for layout.
    pub fn request_layout(&mut self) {
        self.tree.request_layout(self.node);
    }

    /// Ties a subscription to the node's lifetime.
    pub fn hold_subscription(&mut self, subscription: Subscription) {
        self.tree.hold_subscription(self.node, subscription);
    }
}
