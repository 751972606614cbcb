//! Node tree: ownership, lifecycle, layout and focus.
//!
//! ## Lifecycle
//!
//! Nodes are created detached and attached with [`NodeTree::add_child`].
//! [`NodeTree::dispose`] works in two phases:
//!
//! 1. **Mark** (immediate): the whole subtree is flagged disposed, its
//!    subscriptions are released and focus is cleared. From here on the nodes
//!    receive no events, draw nothing and report no parent or children.
//! 2. **Remove**: the subtree is detached from its parent and dropped from
//!    the arena. While a traversal is running (Update, input dispatch or a
//!    widget call) this is queued and flushed when the traversal unwinds, so
//!    no children list changes under an iterator.

use super::context::UpdateContext;
use super::core::{Group, Widget};
use crate::animation::AnimationConfig;
use crate::error::{TreeError, TreeResult};
use crate::layout::{self, Rect, Sizing};
use crate::node::{clamp_alpha, Node, NodeFlags, NodeId};
use slotmap::SlotMap;
use trackside_shared::Subscription;

/// Retained-mode node tree.
pub struct NodeTree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    viewport: Rect,
    focus: Option<NodeId>,
    /// Active traversal depth; removals are deferred while non-zero.
    depth: u32,
    /// Disposed subtrees awaiting removal.
    pending: Vec<NodeId>,
    /// Focus notifications for widgets that were busy when focus moved.
    deferred_focus: Vec<(NodeId, bool)>,
    pub(crate) animation: AnimationConfig,
}

impl NodeTree {
    /// Creates a tree whose root covers `viewport`.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self::with_animation(viewport, AnimationConfig::default())
    }

    /// Creates a tree with an explicit animation policy.
    #[must_use]
    pub fn with_animation(viewport: Rect, animation: AnimationConfig) -> Self {
        let mut nodes = SlotMap::with_capacity_and_key(256);
        let root = nodes.insert(Node::new(Box::new(Group), Rect::UNIT, Sizing::Relative));
        Self {
            nodes,
            root,
            viewport,
            focus: None,
            depth: 0,
            pending: Vec::new(),
            deferred_focus: Vec::new(),
            animation,
        }
    }

    /// The root node. It spans the viewport and cannot be disposed.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Resizes the viewport and schedules a full relayout.
    pub fn set_viewport(&mut self, viewport: Rect) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.request_layout(self.root);
        }
    }

    /// Animation policy used by every `animate_*` call.
    #[must_use]
    pub fn animation_config(&self) -> AnimationConfig {
        self.animation
    }

    /// Replaces the animation policy for animations started from now on.
    pub fn set_animation_config(&mut self, config: AnimationConfig) {
        self.animation = config;
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.values().filter(|n| n.is_live()).count()
    }

    /// Always false; the root is permanent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Creates a detached node filling its parent.
    pub fn create<W: Widget>(&mut self, widget: W) -> NodeId {
        self.create_with(widget, Rect::UNIT, Sizing::Relative)
    }

    /// Creates a detached node with explicit bounds.
    pub fn create_with<W: Widget>(&mut self, widget: W, relative: Rect, sizing: Sizing) -> NodeId {
        self.create_boxed(Box::new(widget), relative, sizing)
    }

    /// Creates a detached node from a boxed widget.
    pub fn create_boxed(&mut self, widget: Box<dyn Widget>, relative: Rect, sizing: Sizing) -> NodeId {
        let id = self.nodes.insert(Node::new(widget, relative, sizing));
        tracing::trace!(node = ?id, "node created");
        id
    }

    /// Appends `child` to `parent`'s children (drawn on top of earlier ones).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        if !self.is_alive(parent) {
            return Err(TreeError::StaleNode(parent));
        }
        if !self.is_alive(child) {
            return Err(TreeError::StaleNode(child));
        }
        if child == self.root {
            return Err(TreeError::RootNotAttachable);
        }
        if let Some(existing) = self.nodes[child].parent {
            return Err(TreeError::AlreadyAttached {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.request_layout(child);
        Ok(())
    }

    /// Removes `child` from its parent without disposing it.
    ///
    /// Returns false if the node was not attached.
    pub fn detach(&mut self, child: NodeId) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        self.unlink(parent, child);
        true
    }

    /// Disposes `child` if it is a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.dispose(child);
        true
    }

    /// Disposes a node and its whole subtree.
    ///
    /// Idempotent: unknown, stale or already disposed ids are ignored.
    pub fn dispose(&mut self, id: NodeId) {
        if id == self.root {
            tracing::warn!("refusing to dispose the root node");
            return;
        }
        match self.nodes.get(id) {
            Some(node) if node.is_live() => {}
            _ => return,
        }

        let subtree = self.subtree(id);
        let mut released = 0usize;
        for &n in &subtree {
            if let Some(node) = self.nodes.get_mut(n) {
                node.flags.set(NodeFlags::DISPOSED);
                node.animation = None;
                for mut subscription in node.subscriptions.drain(..) {
                    subscription.release();
                    released += 1;
                }
            }
            if self.focus == Some(n) {
                self.focus = None;
            }
        }
        tracing::debug!(
            node = ?id,
            nodes = subtree.len(),
            subscriptions = released,
            deferred = self.depth > 0,
            "node disposed"
        );

        if self.depth > 0 {
            self.pending.push(id);
        } else {
            self.remove_now(id);
        }
    }

    /// Returns true if the node exists and is not disposed.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_live)
    }

    /// Parent of a live node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.live(id).and_then(|n| n.parent)
    }

    /// Children of a live node in paint order. Empty for disposed nodes.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.live(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Widget name of a live node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&'static str> {
        self.live(id).map(|n| n.name)
    }

    /// Ties a subscription to a node; it is released when the node is
    /// disposed. Released immediately if the node is already gone.
    pub fn hold_subscription(&mut self, id: NodeId, subscription: Subscription) {
        match self.live_mut(id) {
            Some(node) => node.subscriptions.push(subscription),
            None => drop(subscription),
        }
    }

    /// Number of subscriptions held by a node.
    #[must_use]
    pub fn subscription_count(&self, id: NodeId) -> usize {
        self.live(id).map_or(0, |n| n.subscriptions.len())
    }

    /// Live nodes reachable from the root, in paint order.
    #[must_use]
    pub fn descendants(&self) -> Vec<NodeId> {
        self.subtree(self.root)
    }

    // ------------------------------------------------------------------
    // Node state
    // ------------------------------------------------------------------

    /// Relative bounds of a live node.
    #[must_use]
    pub fn relative_bounds(&self, id: NodeId) -> Option<Rect> {
        self.live(id).map(|n| n.relative)
    }

    /// Absolute bounds from the last layout pass.
    #[must_use]
    pub fn absolute_bounds(&self, id: NodeId) -> Option<Rect> {
        self.live(id).map(|n| n.absolute)
    }

    /// Sizing mode of a live node.
    #[must_use]
    pub fn sizing(&self, id: NodeId) -> Option<Sizing> {
        self.live(id).map(|n| n.sizing)
    }

    /// Own alpha of a live node.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> Option<f32> {
        self.live(id).map(|n| n.alpha)
    }

    /// Own visibility flag of a live node.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.live(id).is_some_and(|n| n.flags.has(NodeFlags::VISIBLE))
    }

    /// Rewrites relative bounds and schedules layout.
    ///
    /// While the node is animating the new bounds become the animation's
    /// target instead.
    pub fn set_relative_bounds(&mut self, id: NodeId, relative: Rect) {
        self.rewrite_relative(id, |_| relative);
    }

    /// Switches between relative and fixed-pixel sizing.
    pub fn set_sizing(&mut self, id: NodeId, sizing: Sizing) {
        if let Some(node) = self.live_mut(id) {
            node.sizing = sizing;
            self.request_layout(id);
        }
    }

    /// Shows or hides a node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.live_mut(id) {
            node.flags.assign(NodeFlags::VISIBLE, visible);
            self.request_redraw(id);
        }
    }

    /// Sets a node's own alpha, clamped to [0, 1].
    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        if let Some(node) = self.live_mut(id) {
            node.alpha = clamp_alpha(alpha);
            self.request_redraw(id);
        }
    }

    // ------------------------------------------------------------------
    // Dirty tracking & layout
    // ------------------------------------------------------------------

    /// Marks a node's absolute bounds stale. Recomputed on the next layout.
    pub fn request_layout(&mut self, id: NodeId) {
        let Some(node) = self.live_mut(id) else {
            return;
        };
        node.flags.set(NodeFlags::DIRTY_LAYOUT);
        let mut cursor = node.parent;
        while let Some(parent) = cursor {
            let Some(node) = self.nodes.get_mut(parent) else {
                break;
            };
            if node.flags.has(NodeFlags::DIRTY_DESCENDANT) {
                break;
            }
            node.flags.set(NodeFlags::DIRTY_DESCENDANT);
            cursor = node.parent;
        }
        self.request_redraw(id);
    }

    /// Marks a node for redraw. Propagates up to the first marked ancestor.
    pub fn request_redraw(&mut self, id: NodeId) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get_mut(current) else {
                break;
            };
            if node.flags.has(NodeFlags::DIRTY_RENDER) && current != id {
                break;
            }
            node.flags.set(NodeFlags::DIRTY_RENDER);
            cursor = node.parent;
        }
    }

    /// Returns true if anything under the root asked for a redraw.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.nodes[self.root].flags.has(NodeFlags::DIRTY_RENDER)
    }

    /// Returns true if a layout pass would recompute anything.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        let flags = self.nodes[self.root].flags;
        flags.has(NodeFlags::DIRTY_LAYOUT) || flags.has(NodeFlags::DIRTY_DESCENDANT)
    }

    /// Resolves absolute bounds for dirty subtrees.
    pub fn layout(&mut self) {
        self.layout_node(self.root, self.viewport, false);
    }

    /// Resolves absolute bounds for every node.
    pub fn layout_all(&mut self) {
        self.layout_node(self.root, self.viewport, true);
    }

    fn layout_node(&mut self, id: NodeId, parent_rect: Rect, force: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.is_live() {
            return;
        }
        let dirty = force || node.flags.has(NodeFlags::DIRTY_LAYOUT);
        if !dirty && !node.flags.has(NodeFlags::DIRTY_DESCENDANT) {
            return;
        }
        if dirty {
            let absolute = layout::resolve(parent_rect, node.relative, node.sizing);
            if absolute != node.absolute {
                node.flags.set(NodeFlags::DIRTY_RENDER);
            }
            node.absolute = absolute;
        }
        node.flags.clear(NodeFlags::DIRTY_LAYOUT | NodeFlags::DIRTY_DESCENDANT);

        let rect = node.absolute;
        let count = node.children.len();
        for index in 0..count {
            let Some(child) = self.nodes.get(id).and_then(|n| n.children.get(index).copied()) else {
                break;
            };
            self.layout_node(child, rect, dirty);
        }
    }

    pub(crate) fn clear_render_flags(&mut self) {
        for node in self.nodes.values_mut() {
            node.flags.clear(NodeFlags::DIRTY_RENDER);
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// The node receiving keyboard input.
    #[must_use]
    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// Transfers focus. Disposed ids clear focus.
    pub fn set_focus(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.is_alive(*id));
        if self.focus == id {
            return;
        }
        let previous = std::mem::replace(&mut self.focus, id);
        tracing::debug!(from = ?previous, to = ?id, "focus changed");

        if let Some(previous) = previous {
            self.notify_focus(previous, false);
        }
        if let Some(next) = id {
            self.notify_focus(next, true);
        }
    }

    fn notify_focus(&mut self, id: NodeId, focused: bool) {
        if self.with_widget(id, |w, _| w.on_focus(focused)).is_none() && self.is_alive(id) {
            // The widget is running a handler right now.
            self.deferred_focus.push((id, focused));
        }
        self.request_redraw(id);
    }

    // ------------------------------------------------------------------
    // Update & widget access
    // ------------------------------------------------------------------

    /// Advances animations, then updates every live widget in paint order.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.advance_animations(dt);

        let order = self.descendants();
        self.enter();
        for id in order {
            if !self.is_alive(id) {
                continue;
            }
            self.with_widget(id, |widget, tree| {
                widget.update(&mut UpdateContext::new(tree, id, dt));
            });
        }
        self.leave();
    }

    /// Runs `f` with a node's widget taken out of the tree.
    ///
    /// Returns None for disposed nodes and for a widget that is already in
    /// use further up the stack.
    pub fn with_widget<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Option<R> {
        let mut widget = self.live_mut(id)?.widget.take()?;
        self.enter();
        let result = f(widget.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
        self.leave();
        self.deliver_deferred_focus(id);
        Some(result)
    }

    fn deliver_deferred_focus(&mut self, id: NodeId) {
        if self.deferred_focus.is_empty() {
            return;
        }
        let mut delivered = Vec::new();
        self.deferred_focus.retain(|(node, focused)| {
            if *node == id {
                delivered.push(*focused);
                false
            } else {
                true
            }
        });
        for focused in delivered {
            if let Some(widget) = self.live_mut(id).and_then(|n| n.widget.as_mut()) {
                widget.on_focus(focused);
            }
        }
    }

    /// Starts a traversal; removals are deferred until the matching
    /// [`Self::leave`].
    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    /// Ends a traversal and flushes deferred removals at depth zero.
    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            tracing::trace!(count = pending.len(), "flushing deferred removals");
            for id in pending {
                self.remove_now(id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn live(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| n.is_live())
    }

    pub(crate) fn live_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| n.is_live())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node)> {
        self.nodes.iter_mut()
    }

    /// `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|n| n.parent);
        }
        false
    }

    /// Live subtree rooted at `id` in paint order (pre-order).
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.live(current) else {
                continue;
            };
            out.push(current);
            // Push children in reverse order so they're processed left-to-right
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        self.request_redraw(parent);
    }

    /// Detaches then drops a disposed subtree.
    fn remove_now(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            self.unlink(parent, id);
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let Some(mut node) = self.nodes.remove(id) else {
            return;
        };
        if let Some(widget) = node.widget.as_mut() {
            widget.on_dispose();
        }
        for child in std::mem::take(&mut node.children) {
            self.remove_subtree(child);
        }
    }
}

impl std::fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTree")
            .field("nodes", &self.len())
            .field("viewport", &self.viewport)
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trackside_shared::EventChannel;

    struct Probe {
        log: Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    }

    impl Widget for Probe {
        fn on_focus(&mut self, focused: bool) {
            self.log.borrow_mut().push(format!("{}:focus:{focused}", self.tag));
        }

        fn on_dispose(&mut self) {
            self.log.borrow_mut().push(format!("{}:dispose", self.tag));
        }
    }

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 500.0)
    }

    #[test]
    fn test_tree_hierarchy() {
        let mut tree = NodeTree::new(viewport());
        let a = tree.create(Group);
        let b = tree.create(Group);
        tree.add_child(tree.root(), a).expect("attach a");
        tree.add_child(tree.root(), b).expect("attach b");

        assert_eq!(tree.children(tree.root()), &[a, b]);
        assert_eq!(tree.parent(a), Some(tree.root()));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_add_child_errors() {
        let mut tree = NodeTree::new(viewport());
        let root = tree.root();
        let a = tree.create(Group);
        let b = tree.create(Group);
        tree.add_child(root, a).expect("attach");
        tree.add_child(a, b).expect("attach");

        assert_eq!(
            tree.add_child(root, a),
            Err(TreeError::AlreadyAttached { child: a, parent: root })
        );
        assert!(tree.detach(a));
        assert_eq!(tree.add_child(b, a), Err(TreeError::WouldCycle { parent: b, child: a }));
        assert_eq!(tree.add_child(a, a), Err(TreeError::WouldCycle { parent: a, child: a }));
        assert_eq!(tree.add_child(a, root), Err(TreeError::RootNotAttachable));

        tree.dispose(a);
        assert_eq!(tree.add_child(root, a), Err(TreeError::StaleNode(a)));
    }

    #[test]
    fn test_dispose_is_idempotent_and_recursive() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = NodeTree::new(viewport());
        let parent = tree.create(Probe { log: log.clone(), tag: "parent" });
        let child = tree.create(Probe { log: log.clone(), tag: "child" });
        tree.add_child(tree.root(), parent).expect("attach");
        tree.add_child(parent, child).expect("attach");

        tree.dispose(parent);
        tree.dispose(parent);
        tree.dispose(child);

        assert!(!tree.is_alive(parent));
        assert!(!tree.is_alive(child));
        assert!(tree.parent(parent).is_none());
        assert!(tree.children(parent).is_empty());
        assert!(tree.children(tree.root()).is_empty());
        assert_eq!(*log.borrow(), vec!["parent:dispose", "child:dispose"]);
    }

    #[test]
    fn test_dispose_root_is_refused() {
        let mut tree = NodeTree::new(viewport());
        tree.dispose(tree.root());
        assert!(tree.is_alive(tree.root()));
    }

    #[test]
    fn test_dispose_releases_subscriptions() {
        let channel: EventChannel<u32> = EventChannel::new("test");
        let mut tree = NodeTree::new(viewport());
        let node = tree.create(Group);
        tree.add_child(tree.root(), node).expect("attach");
        tree.hold_subscription(node, channel.subscribe(|_| {}));
        tree.hold_subscription(node, channel.subscribe(|_| {}));
        assert_eq!(channel.subscriber_count(), 2);

        tree.dispose(node);
        assert_eq!(channel.subscriber_count(), 0);

        // Holding on a dead node releases at once.
        tree.hold_subscription(node, channel.subscribe(|_| {}));
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_removal_deferred_during_widget_call() {
        let mut tree = NodeTree::new(viewport());
        let a = tree.create(Group);
        let b = tree.create(Group);
        tree.add_child(tree.root(), a).expect("attach");
        tree.add_child(tree.root(), b).expect("attach");

        tree.with_widget(a, |_, tree| {
            tree.dispose(b);
            assert!(!tree.is_alive(b));
            // Still physically present until the call unwinds.
            assert_eq!(tree.nodes[tree.root].children.len(), 2);
        });
        assert_eq!(tree.children(tree.root()), &[a]);
    }

    #[test]
    fn test_layout_scenario() {
        let mut tree = NodeTree::new(viewport());
        let child = tree.create_with(Group, Rect::new(0.1, 0.2, 0.5, 0.6), Sizing::Relative);
        tree.add_child(tree.root(), child).expect("attach");
        assert!(tree.needs_layout());

        tree.layout();
        assert_eq!(
            tree.absolute_bounds(child),
            Some(Rect::new(100.0, 100.0, 500.0, 300.0))
        );
        assert!(!tree.needs_layout());
    }

    #[test]
    fn test_layout_only_touches_dirty_subtrees() {
        let mut tree = NodeTree::new(viewport());
        let a = tree.create_with(Group, Rect::new(0.0, 0.0, 0.5, 1.0), Sizing::Relative);
        let b = tree.create_with(Group, Rect::new(0.5, 0.0, 0.5, 1.0), Sizing::Relative);
        tree.add_child(tree.root(), a).expect("attach");
        tree.add_child(tree.root(), b).expect("attach");
        tree.layout();

        // Change b's relative bounds behind the dirty tracking's back.
        tree.nodes[b].relative = Rect::UNIT;
        tree.set_relative_bounds(a, Rect::new(0.0, 0.0, 0.25, 1.0));
        tree.layout();

        assert_eq!(tree.absolute_bounds(a), Some(Rect::new(0.0, 0.0, 250.0, 500.0)));
        assert_eq!(tree.absolute_bounds(b), Some(Rect::new(500.0, 0.0, 500.0, 500.0)));

        tree.layout_all();
        assert_eq!(tree.absolute_bounds(b), Some(viewport()));
    }

    #[test]
    fn test_viewport_resize_relayouts() {
        let mut tree = NodeTree::new(viewport());
        let child = tree.create_with(Group, Rect::new(0.5, 0.5, 0.5, 0.5), Sizing::Relative);
        tree.add_child(tree.root(), child).expect("attach");
        tree.layout();

        tree.set_viewport(Rect::new(0.0, 0.0, 200.0, 100.0));
        tree.layout();
        assert_eq!(tree.absolute_bounds(child), Some(Rect::new(100.0, 50.0, 100.0, 50.0)));
    }

    #[test]
    fn test_focus_transfer() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = NodeTree::new(viewport());
        let a = tree.create(Probe { log: log.clone(), tag: "a" });
        let b = tree.create(Probe { log: log.clone(), tag: "b" });
        tree.add_child(tree.root(), a).expect("attach");
        tree.add_child(tree.root(), b).expect("attach");

        tree.set_focus(Some(a));
        tree.set_focus(Some(b));
        assert_eq!(tree.focus(), Some(b));
        assert_eq!(*log.borrow(), vec!["a:focus:true", "a:focus:false", "b:focus:true"]);

        tree.dispose(b);
        assert_eq!(tree.focus(), None);
    }

    #[test]
    fn test_focus_notification_deferred_for_busy_widget() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tree = NodeTree::new(viewport());
        let a = tree.create(Probe { log: log.clone(), tag: "a" });
        tree.add_child(tree.root(), a).expect("attach");

        tree.with_widget(a, |_, tree| tree.set_focus(Some(a)));
        assert_eq!(*log.borrow(), vec!["a:focus:true"]);
    }

    #[test]
    fn test_alpha_is_clamped() {
        let mut tree = NodeTree::new(viewport());
        let a = tree.create(Group);
        tree.set_alpha(a, 3.0);
        assert_eq!(tree.alpha(a), Some(1.0));
        tree.set_alpha(a, f32::NAN);
        assert_eq!(tree.alpha(a), Some(0.0));
    }

    #[test]
    fn test_redraw_propagates_to_root() {
        let mut tree = NodeTree::new(viewport());
        let a = tree.create(Group);
        tree.add_child(tree.root(), a).expect("attach");
        tree.clear_render_flags();
        assert!(!tree.needs_redraw());

        tree.request_redraw(a);
        assert!(tree.needs_redraw());
    }
}
