//! Per-node state stored in the tree arena.

use crate::animation::BoundsAnimation;
use crate::layout::{Rect, Sizing};
use crate::widget::Widget;
use slotmap::new_key_type;
use trackside_shared::Subscription;

new_key_type! {
    /// Generational handle to a node. Stale handles never alias a new node.
    pub struct NodeId;
}

/// Node state flags (bitfield).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeFlags(u32);

impl NodeFlags {
    /// Node is visible.
    pub const VISIBLE: u32 = 1 << 0;
    /// Node was disposed; terminal.
    pub const DISPOSED: u32 = 1 << 1;
    /// Absolute bounds are stale.
    pub const DIRTY_LAYOUT: u32 = 1 << 2;
    /// Some descendant has stale absolute bounds.
    pub const DIRTY_DESCENDANT: u32 = 1 << 3;
    /// Node or a descendant needs redraw.
    pub const DIRTY_RENDER: u32 = 1 << 4;

    /// Default flags for a new node.
    pub const DEFAULT: Self = Self(Self::VISIBLE | Self::DIRTY_LAYOUT | Self::DIRTY_RENDER);

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn assign(&mut self, flag: u32, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A tree-resident unit.
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) relative: Rect,
    pub(crate) absolute: Rect,
    pub(crate) sizing: Sizing,
    pub(crate) alpha: f32,
    pub(crate) flags: NodeFlags,
    pub(crate) animation: Option<BoundsAnimation>,
    pub(crate) subscriptions: Vec<Subscription>,
    /// Taken out while one of its methods runs.
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) name: &'static str,
}

impl Node {
    pub(crate) fn new(widget: Box<dyn Widget>, relative: Rect, sizing: Sizing) -> Self {
        let name = widget.name();
        Self {
            parent: None,
            children: Vec::new(),
            relative,
            absolute: Rect::ZERO,
            sizing,
            alpha: 1.0,
            flags: NodeFlags::DEFAULT,
            animation: None,
            subscriptions: Vec::new(),
            widget: Some(widget),
            name,
        }
    }

    #[inline]
    pub(crate) fn is_live(&self) -> bool {
        !self.flags.has(NodeFlags::DISPOSED)
    }

    /// Live, visible and not fully transparent.
    #[inline]
    pub(crate) fn is_rendered(&self) -> bool {
        self.is_live() && self.flags.has(NodeFlags::VISIBLE) && self.alpha > 0.0
    }
}

/// Clamps alpha to [0, 1]; NaN becomes fully transparent.
#[inline]
pub(crate) fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let mut flags = NodeFlags::default();
        assert!(flags.has(NodeFlags::VISIBLE));
        assert!(!flags.has(NodeFlags::DISPOSED));

        flags.assign(NodeFlags::VISIBLE, false);
        flags.set(NodeFlags::DISPOSED);
        assert!(!flags.has(NodeFlags::VISIBLE));
        assert!(flags.has(NodeFlags::DISPOSED));
    }

    #[test]
    fn test_clamp_alpha() {
        assert_eq!(clamp_alpha(f32::NAN), 0.0);
        assert_eq!(clamp_alpha(-1.0), 0.0);
        assert_eq!(clamp_alpha(2.0), 1.0);
        assert_eq!(clamp_alpha(0.5), 0.5);
    }
}
