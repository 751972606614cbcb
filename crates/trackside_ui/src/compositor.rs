//! Draw traversal.
//!
//! Depth-first in paint order. Each node draws with the product of its own
//! alpha and every ancestor's. A hidden or fully transparent node prunes its
//! whole subtree: no draw calls are issued below it.

use crate::node::NodeId;
use crate::render::Drawer;
use crate::widget::{DrawContext, NodeTree};

/// Counters for one draw pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Nodes reached by the traversal.
    pub visited: usize,
    /// Nodes whose widget drew.
    pub drawn: usize,
    /// Subtrees pruned for visibility or alpha.
    pub skipped: usize,
}

/// Runs draw passes over a [`NodeTree`].
#[derive(Debug, Default)]
pub struct Compositor {
    last: DrawStats,
    frames: u64,
}

impl Compositor {
    /// Creates a compositor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays out dirty subtrees, then draws the whole tree.
    pub fn draw(&mut self, tree: &mut NodeTree, drawer: &mut dyn Drawer) -> DrawStats {
        tree.layout();

        let mut stats = DrawStats::default();
        let root = tree.root();
        tree.enter();
        draw_node(tree, drawer, root, 1.0, &mut stats);
        tree.leave();
        tree.clear_render_flags();

        self.last = stats;
        self.frames += 1;
        tracing::trace!(
            visited = stats.visited,
            drawn = stats.drawn,
            skipped = stats.skipped,
            "frame composed"
        );
        stats
    }

    /// Stats of the last pass.
    #[must_use]
    pub fn last_stats(&self) -> DrawStats {
        self.last
    }

    /// Number of passes run.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn draw_node(
    tree: &mut NodeTree,
    drawer: &mut dyn Drawer,
    id: NodeId,
    parent_alpha: f32,
    stats: &mut DrawStats,
) {
    let focus = tree.focus();
    let Some(node) = tree.live(id) else {
        return;
    };
    stats.visited += 1;

    let alpha = node.alpha * parent_alpha;
    if !node.is_rendered() || alpha <= 0.0 {
        stats.skipped += 1;
        return;
    }
    let bounds = node.absolute;
    let count = node.children.len();

    if let Some(mut widget) = tree.node_mut(id).and_then(|n| n.widget.take()) {
        let mut ctx = DrawContext::new(&mut *drawer, id, bounds, alpha, focus == Some(id));
        widget.draw(&mut ctx);
        if let Some(node) = tree.node_mut(id) {
            node.widget = Some(widget);
        }
        stats.drawn += 1;
    }

    for index in 0..count {
        let Some(child) = tree.live(id).and_then(|n| n.children.get(index).copied()) else {
            break;
        };
        draw_node(tree, drawer, child, alpha, stats);
    }
}
