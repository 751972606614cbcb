//! Input routing.
//!
//! Mouse events are hit-tested from the root into the topmost child whose
//! subtree contains the point, then bubbled leaf to root until a handler
//! returns [`EventOutcome::Handle`]. A node is hit by its own absolute
//! bounds, so a child placed outside its parent (a close badge past the
//! corner) still receives clicks.
//!
//! Keyboard events go to the focus node only.
//!
//! Drag and drop: pressing on a node whose widget offers a payload arms a
//! drag; moving past the threshold starts it; releasing offers the payload
//! to every node under the pointer, leaf first, until one accepts.

use crate::input::{
    ButtonState, DispatchOutcome, DragPayload, DropEvent, InputEvent, Key, KeyEvent, MouseButton,
    MouseEvent,
};
use crate::node::NodeId;
use crate::widget::{EventContext, EventOutcome, NodeTree};

/// Router tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouterConfig {
    /// Pointer travel in pixels before a press becomes a drag.
    pub drag_threshold: f32,
    /// Double-click time threshold (seconds).
    pub double_click_time: f32,
    /// Double-click position threshold (pixels).
    pub double_click_distance: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            double_click_time: 0.3,
            double_click_distance: 5.0,
        }
    }
}

enum DragState {
    Idle,
    Armed {
        source: NodeId,
        payload: Box<dyn DragPayload>,
        origin: (f32, f32),
    },
    Dragging {
        source: NodeId,
        payload: Box<dyn DragPayload>,
    },
}

/// Counts consecutive clicks close together in time and space.
#[derive(Debug, Default)]
struct ClickTracker {
    last_time: Option<f32>,
    last_pos: (f32, f32),
    count: u8,
}

impl ClickTracker {
    fn press(&mut self, config: &RouterConfig, now: f32, x: f32, y: f32) -> u8 {
        let chained = self.last_time.is_some_and(|last| {
            let dx = x - self.last_pos.0;
            let dy = y - self.last_pos.1;
            now - last < config.double_click_time
                && (dx * dx + dy * dy).sqrt() < config.double_click_distance
        });
        self.count = if chained { self.count.saturating_add(1) } else { 1 };
        self.last_time = Some(now);
        self.last_pos = (x, y);
        self.count
    }
}

/// Routes host input into a [`NodeTree`].
pub struct InputRouter {
    config: RouterConfig,
    hovered: Option<NodeId>,
    drag: DragState,
    clicks: ClickTracker,
    /// Seconds accumulated through [`Self::tick`].
    clock: f32,
}

impl InputRouter {
    /// Creates a router.
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            hovered: None,
            drag: DragState::Idle,
            clicks: ClickTracker::default(),
            clock: 0.0,
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> RouterConfig {
        self.config
    }

    /// Advances the clock used for double-click detection.
    pub fn tick(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
    }

    /// Node under the pointer after the last mouse event.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Source node of the drag in progress.
    #[must_use]
    pub fn dragging(&self) -> Option<NodeId> {
        match &self.drag {
            DragState::Dragging { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Hit path for a point, leaf first. Empty if nothing is hit.
    #[must_use]
    pub fn hit_test(tree: &NodeTree, x: f32, y: f32) -> Vec<NodeId> {
        let mut path = Vec::new();
        hit(tree, tree.root(), x, y, &mut path);
        path
    }

    /// Routes one event.
    pub fn dispatch(&mut self, tree: &mut NodeTree, event: &InputEvent) -> DispatchOutcome {
        tree.layout();
        tree.enter();
        let outcome = match event {
            InputEvent::Mouse(mouse) => self.dispatch_mouse(tree, mouse),
            InputEvent::Key(key) => self.dispatch_key(tree, key),
        };
        tree.leave();
        outcome
    }

    fn dispatch_mouse(&mut self, tree: &mut NodeTree, event: &MouseEvent) -> DispatchOutcome {
        let path = Self::hit_test(tree, event.x, event.y);
        self.update_hover(tree, path.first().copied());

        match event.state {
            ButtonState::Pressed => {
                let mut event = *event;
                if event.button == Some(MouseButton::Left) {
                    event.clicks = self.clicks.press(&self.config, self.clock, event.x, event.y);
                    self.arm_drag(tree, &path, &event);
                }
                bubble(tree, &path, &event)
            }
            ButtonState::Moved => {
                if let Some(outcome) = self.advance_drag(tree, event) {
                    return outcome;
                }
                bubble(tree, &path, event)
            }
            ButtonState::Released => {
                match std::mem::replace(&mut self.drag, DragState::Idle) {
                    DragState::Dragging { source, payload } => {
                        return finish_drop(tree, &path, source, payload.as_ref(), event);
                    }
                    DragState::Armed { .. } | DragState::Idle => {}
                }
                bubble(tree, &path, event)
            }
        }
    }

    fn dispatch_key(&mut self, tree: &mut NodeTree, event: &KeyEvent) -> DispatchOutcome {
        if event.pressed && event.key == Key::Escape {
            if let DragState::Dragging { source, .. } =
                std::mem::replace(&mut self.drag, DragState::Idle)
            {
                tracing::debug!(source = ?source, "drag cancelled");
                return DispatchOutcome::DragCancelled { source };
            }
        }

        let Some(focus) = tree.focus() else {
            return DispatchOutcome::Ignored;
        };
        let outcome = tree.with_widget(focus, |widget, tree| {
            widget.on_key(event, &mut EventContext::new(tree, focus))
        });
        match outcome {
            Some(EventOutcome::Handle) => DispatchOutcome::Handled(focus),
            _ => DispatchOutcome::Ignored,
        }
    }

    fn arm_drag(&mut self, tree: &mut NodeTree, path: &[NodeId], event: &MouseEvent) {
        self.drag = DragState::Idle;
        for &id in path {
            let payload = tree.with_widget(id, |widget, _| widget.drag_payload()).flatten();
            if let Some(payload) = payload {
                self.drag = DragState::Armed {
                    source: id,
                    payload,
                    origin: (event.x, event.y),
                };
                return;
            }
        }
    }

    /// Promotes an armed drag once the pointer travels far enough.
    ///
    /// Returns an outcome when the move belongs to the drag.
    fn advance_drag(&mut self, tree: &NodeTree, event: &MouseEvent) -> Option<DispatchOutcome> {
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Idle => None,
            DragState::Armed {
                source,
                payload,
                origin,
            } => {
                let dx = event.x - origin.0;
                let dy = event.y - origin.1;
                if (dx * dx + dy * dy).sqrt() <= self.config.drag_threshold {
                    self.drag = DragState::Armed {
                        source,
                        payload,
                        origin,
                    };
                    return None;
                }
                if !tree.is_alive(source) {
                    return None;
                }
                tracing::debug!(source = ?source, payload = payload.label(), "drag started");
                self.drag = DragState::Dragging { source, payload };
                Some(DispatchOutcome::Handled(source))
            }
            DragState::Dragging { source, payload } => {
                if !tree.is_alive(source) {
                    tracing::debug!(source = ?source, "drag source disposed");
                    return Some(DispatchOutcome::DragCancelled { source });
                }
                self.drag = DragState::Dragging { source, payload };
                Some(DispatchOutcome::Handled(source))
            }
        }
    }

    fn update_hover(&mut self, tree: &mut NodeTree, leaf: Option<NodeId>) {
        if self.hovered == leaf {
            return;
        }
        if let Some(previous) = self.hovered.take() {
            if tree.with_widget(previous, |w, _| w.on_hover(false)).is_some() {
                tree.request_redraw(previous);
            }
        }
        if let Some(next) = leaf {
            tree.with_widget(next, |w, _| w.on_hover(true));
            tree.request_redraw(next);
        }
        self.hovered = leaf;
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

fn hit(tree: &NodeTree, id: NodeId, x: f32, y: f32, path: &mut Vec<NodeId>) -> bool {
    let Some(node) = tree.live(id) else {
        return false;
    };
    if !node.is_rendered() {
        return false;
    }
    // Topmost (last painted) first.
    for &child in node.children.iter().rev() {
        if hit(tree, child, x, y, path) {
            path.push(id);
            return true;
        }
    }
    if node.absolute.contains(x, y) {
        path.push(id);
        return true;
    }
    false
}

fn bubble(tree: &mut NodeTree, path: &[NodeId], event: &MouseEvent) -> DispatchOutcome {
    for &id in path {
        if !tree.is_alive(id) {
            continue;
        }
        let outcome = tree.with_widget(id, |widget, tree| {
            widget.on_mouse(event, &mut EventContext::new(tree, id))
        });
        if outcome == Some(EventOutcome::Handle) {
            return DispatchOutcome::Handled(id);
        }
    }
    DispatchOutcome::Ignored
}

fn finish_drop(
    tree: &mut NodeTree,
    path: &[NodeId],
    source: NodeId,
    payload: &dyn DragPayload,
    event: &MouseEvent,
) -> DispatchOutcome {
    if !tree.is_alive(source) {
        tracing::debug!(source = ?source, "drag source disposed before drop");
        return DispatchOutcome::DragCancelled { source };
    }
    let offer = DropEvent {
        source,
        payload,
        x: event.x,
        y: event.y,
    };
    for &target in path {
        if target == source || !tree.is_alive(target) {
            continue;
        }
        let accepted = tree
            .with_widget(target, |widget, tree| {
                widget.on_drop(&offer, &mut EventContext::new(tree, target))
            })
            .unwrap_or(false);
        if accepted {
            tracing::debug!(source = ?source, target = ?target, "drop accepted");
            return DispatchOutcome::Dropped { source, target };
        }
    }
    tracing::debug!(source = ?source, "drop rejected");
    DispatchOutcome::DropRejected { source }
}
