//! Bounds animation, alignment and scaling on the node tree.
//!
//! All of these rewrite relative bounds only. When an animation is in flight
//! the rewrite goes to its target instead, so the animation does not undo it
//! on the next tick.

use super::tree::NodeTree;
use crate::animation::BoundsAnimation;
use crate::layout::{distribute, Anchor, Rect};
use crate::node::{clamp_alpha, NodeId};

impl NodeTree {
    /// Animates a node's relative bounds and alpha toward a target.
    ///
    /// A request while another animation is in flight replaces it, starting
    /// from the current value.
    pub fn animate_to(&mut self, id: NodeId, bounds: Rect, alpha: f32) {
        let config = self.animation;
        let alpha = clamp_alpha(alpha);
        let Some(node) = self.live_mut(id) else {
            return;
        };
        match node.animation.as_mut() {
            Some(animation) => animation.set_target(bounds, alpha),
            None => {
                let mut animation = BoundsAnimation::new(node.relative, node.alpha, config);
                animation.set_target(bounds, alpha);
                node.animation = Some(animation);
            }
        }
        tracing::trace!(node = ?id, ?bounds, alpha, "animation started");
    }

    /// Fades a node toward `alpha`.
    pub fn animate_alpha(&mut self, id: NodeId, alpha: f32) {
        if let Some((bounds, _)) = self.target_state(id) {
            self.animate_to(id, bounds, alpha);
        }
    }

    /// Animates a scale of the node's (target) bounds about `anchor`.
    pub fn animate_scale(&mut self, id: NodeId, sx: f32, sy: f32, anchor: Anchor) {
        if let Some((bounds, alpha)) = self.target_state(id) {
            self.animate_to(id, bounds.scale(sx, sy, anchor), alpha);
        }
    }

    /// Returns true while a node has an animation in flight.
    #[must_use]
    pub fn is_animating(&self, id: NodeId) -> bool {
        self.live(id).is_some_and(|n| n.animation.is_some())
    }

    /// Returns true if any live node is animating.
    #[must_use]
    pub fn any_animating(&self) -> bool {
        self.descendants().into_iter().any(|id| self.is_animating(id))
    }

    /// Stops a node's animation where it currently is.
    pub fn cancel_animation(&mut self, id: NodeId) {
        if let Some(node) = self.live_mut(id) {
            node.animation = None;
        }
    }

    /// Shrinks (or grows) relative bounds about the centre.
    pub fn scale(&mut self, id: NodeId, sx: f32, sy: f32) {
        self.scale_about(id, sx, sy, Anchor::Center);
    }

    /// Scales relative bounds about an anchor.
    pub fn scale_about(&mut self, id: NodeId, sx: f32, sy: f32, anchor: Anchor) {
        self.rewrite_relative(id, |r| r.scale(sx, sy, anchor));
    }

    /// Distributes nodes left to right across the parent's full width.
    ///
    /// Only x and width change. Disposed ids are skipped and do not take up
    /// a slot.
    pub fn align_horizontally(&mut self, spacing: f32, nodes: &[NodeId]) {
        let live: Vec<NodeId> = nodes.iter().copied().filter(|id| self.is_alive(*id)).collect();
        for (id, span) in live.iter().zip(distribute(spacing, live.len())) {
            self.rewrite_relative(*id, |r| Rect::new(span.offset, r.y, span.size, r.height));
        }
    }

    /// Distributes nodes top to bottom across the parent's full height.
    pub fn align_vertically(&mut self, spacing: f32, nodes: &[NodeId]) {
        let live: Vec<NodeId> = nodes.iter().copied().filter(|id| self.is_alive(*id)).collect();
        for (id, span) in live.iter().zip(distribute(spacing, live.len())) {
            self.rewrite_relative(*id, |r| Rect::new(r.x, span.offset, r.width, span.size));
        }
    }

    /// Advances every in-flight animation and applies it to its node.
    pub(crate) fn advance_animations(&mut self, dt: f32) {
        let mut moved = Vec::new();
        for (id, node) in self.nodes_mut() {
            if !node.is_live() {
                continue;
            }
            let Some(animation) = node.animation.as_mut() else {
                continue;
            };
            let finished = animation.update(dt);
            let (bounds, alpha) = animation.current();
            node.relative = bounds;
            node.alpha = clamp_alpha(alpha);
            if finished {
                node.animation = None;
                tracing::trace!(node = ?id, "animation settled");
            }
            moved.push(id);
        }
        for id in moved {
            self.request_layout(id);
        }
    }

    /// Where the node is headed: the animation target, or its current state.
    fn target_state(&self, id: NodeId) -> Option<(Rect, f32)> {
        let node = self.live(id)?;
        Some(match &node.animation {
            Some(animation) => animation.target(),
            None => (node.relative, node.alpha),
        })
    }

    pub(super) fn rewrite_relative(&mut self, id: NodeId, f: impl FnOnce(Rect) -> Rect) {
        let Some(node) = self.live_mut(id) else {
            return;
        };
        match node.animation.as_mut() {
            Some(animation) => {
                let (target, alpha) = animation.target();
                animation.set_target(f(target), alpha);
            }
            None => {
                node.relative = f(node.relative);
                self.request_layout(id);
            }
        }
    }
}
