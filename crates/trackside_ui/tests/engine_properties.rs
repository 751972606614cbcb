//! End-to-end checks of the tree, layout, draw and input contract.

use std::cell::RefCell;
use std::rc::Rc;

use trackside_shared::{DomainEvent, EventChannel, PilotId, RaceId};
use trackside_ui::{
    distribute, AnimationConfig, Color, CommandDrawer, Compositor, DispatchOutcome, DragPayload,
    DrawContext, DropEvent, Easing, EventContext, EventOutcome, Group, InputRouter, Key, KeyEvent,
    MapTextureResolver, MouseButton, MouseEvent, NodeId, NodeTree, NullResolver, Rect,
    RenderCommand, Sizing, TextureHandle, TextureSlot, Widget,
};

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Records every mouse event it sees and answers with a fixed outcome.
struct Recorder {
    tag: &'static str,
    log: Log,
    outcome: EventOutcome,
}

impl Recorder {
    fn new(tag: &'static str, log: &Log, outcome: EventOutcome) -> Self {
        Self {
            tag,
            log: log.clone(),
            outcome,
        }
    }
}

impl Widget for Recorder {
    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        ctx.fill(Color::WHITE);
    }

    fn on_mouse(&mut self, event: &MouseEvent, _ctx: &mut EventContext<'_>) -> EventOutcome {
        self.log
            .borrow_mut()
            .push(format!("{}:{:?}:{}", self.tag, event.state, event.clicks));
        self.outcome
    }

    fn on_key(&mut self, event: &KeyEvent, _ctx: &mut EventContext<'_>) -> EventOutcome {
        self.log.borrow_mut().push(format!("{}:key:{:?}", self.tag, event.key));
        self.outcome
    }

    fn on_hover(&mut self, hovered: bool) {
        self.log.borrow_mut().push(format!("{}:hover:{hovered}", self.tag));
    }
}

fn viewport() -> Rect {
    Rect::new(0.0, 0.0, 1000.0, 500.0)
}

fn attach(tree: &mut NodeTree, parent: NodeId, widget: impl Widget, rel: Rect) -> NodeId {
    let id = tree.create_with(widget, rel, Sizing::Relative);
    tree.add_child(parent, id).expect("attach");
    id
}

// ============================================================================
// Layout & alignment
// ============================================================================

#[test]
fn test_concrete_scenario() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let child = attach(&mut tree, root, Group, Rect::new(0.1, 0.2, 0.5, 0.6));
    let row: Vec<_> = (0..3).map(|_| attach(&mut tree, root, Group, Rect::UNIT)).collect();

    tree.align_horizontally(0.05, &row);
    tree.layout();

    assert_eq!(tree.absolute_bounds(child), Some(Rect::new(100.0, 100.0, 500.0, 300.0)));
    for (id, x) in row.iter().zip([0.0_f32, 0.35, 0.70]) {
        let rel = tree.relative_bounds(*id).expect("live");
        assert!((rel.x - x).abs() < 1e-6);
        assert!((rel.width - 0.3).abs() < 1e-6);
        let abs = tree.absolute_bounds(*id).expect("live");
        assert!((abs.x - x * 1000.0).abs() < 1e-3);
    }
}

#[test]
fn test_alignment_partition_sums_to_one() {
    for count in 1..12 {
        for spacing in [0.0_f32, 0.01, 0.02, 0.05] {
            let spans = distribute(spacing, count);
            let total: f32 = spans.iter().map(|s| s.size).sum::<f32>() + spacing * (count - 1) as f32;
            assert!((total - 1.0).abs() < 1e-6, "count {count} spacing {spacing}: {total}");
        }
    }
}

#[test]
fn test_nested_layout_matches_combined_transform() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let outer_rel = Rect::new(0.1, 0.1, 0.8, 0.5);
    let inner_rel = Rect::new(0.25, 0.5, 0.5, 0.25);
    let outer = attach(&mut tree, root, Group, outer_rel);
    let inner = attach(&mut tree, outer, Group, inner_rel);
    tree.layout();

    let combined = trackside_ui::resolve(viewport(), outer_rel.compose(inner_rel), Sizing::Relative);
    let nested = tree.absolute_bounds(inner).expect("live");
    assert!(nested.approx_eq(&combined, 1e-3), "{nested:?} vs {combined:?}");
}

#[test]
fn test_degenerate_parent_yields_zero_area() {
    let mut tree = NodeTree::new(Rect::new(10.0, 10.0, 0.0, 300.0));
    let root = tree.root();
    let child = attach(&mut tree, root, Group, Rect::new(0.5, 0.5, 0.5, 0.5));
    tree.layout();

    let abs = tree.absolute_bounds(child).expect("live");
    assert_eq!(abs.width, 0.0);
    assert_eq!(abs.height, 0.0);
    assert!(abs.x.is_finite() && abs.y.is_finite());
}

#[test]
fn test_fixed_size_node_keeps_relative_position() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let badge = tree.create_with(
        Group,
        Rect::new(0.9, 0.0, 0.0, 0.0),
        Sizing::Fixed { width: 24.0, height: 24.0 },
    );
    tree.add_child(root, badge).expect("attach");
    tree.layout();

    assert_eq!(tree.absolute_bounds(badge), Some(Rect::new(900.0, 0.0, 24.0, 24.0)));
}

#[test]
fn test_layout_is_idempotent() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let a = attach(&mut tree, root, Group, Rect::new(0.13, 0.27, 0.31, 0.57));
    let b = attach(&mut tree, a, Group, Rect::new(0.11, 0.19, 0.71, 0.37));
    tree.layout();
    let first = tree.absolute_bounds(b);

    tree.layout_all();
    tree.layout_all();
    assert_eq!(tree.absolute_bounds(b), first);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_dispose_stops_domain_events() {
    let channel: EventChannel<DomainEvent> = EventChannel::new("race_changed");
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let node = attach(&mut tree, root, Group, Rect::UNIT);

    let (sub, flag) = channel.subscribe_flag(|e| matches!(e, DomainEvent::RaceChanged { .. }));
    tree.hold_subscription(node, sub);

    channel.emit(&DomainEvent::RaceChanged { race: Some(RaceId::new(1)) });
    assert!(flag.take());

    tree.dispose(node);
    tree.dispose(node);
    assert_eq!(channel.emit(&DomainEvent::RaceChanged { race: None }), 0);
    assert!(!flag.is_set());
    assert!(tree.parent(node).is_none());
    assert!(tree.children(node).is_empty());
}

/// Disposes a target node when clicked.
struct Closer {
    target: NodeId,
}

impl Widget for Closer {
    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut EventContext<'_>) -> EventOutcome {
        if event.is_left_press() {
            ctx.dispose(self.target);
            return EventOutcome::Handle;
        }
        EventOutcome::Ignore
    }
}

#[test]
fn test_click_handler_can_dispose_its_own_ancestor() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let card = attach(&mut tree, root, Group, Rect::new(0.0, 0.0, 0.5, 0.5));
    let sibling = attach(&mut tree, root, Group, Rect::new(0.5, 0.0, 0.5, 0.5));
    let close = attach(&mut tree, card, Closer { target: card }, Rect::new(0.9, 0.0, 0.1, 0.1));
    let mut router = InputRouter::default();
    tree.layout();

    let outcome = router.dispatch(&mut tree, &MouseEvent::pressed(460.0, 5.0, MouseButton::Left).into());
    assert_eq!(outcome, DispatchOutcome::Handled(close));
    assert!(!tree.is_alive(card));
    assert!(!tree.is_alive(close));
    assert_eq!(tree.children(root), &[sibling]);

    // Events at the old position now fall through to the root.
    let outcome = router.dispatch(&mut tree, &MouseEvent::pressed(460.0, 5.0, MouseButton::Left).into());
    assert_eq!(outcome, DispatchOutcome::Ignored);
}

// ============================================================================
// Draw
// ============================================================================

#[test]
fn test_visibility_skip_regardless_of_descendants() {
    let log = log();
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let hidden = attach(&mut tree, root, Recorder::new("hidden", &log, EventOutcome::Ignore), Rect::UNIT);
    let child = attach(&mut tree, hidden, Recorder::new("child", &log, EventOutcome::Ignore), Rect::UNIT);
    tree.set_visible(child, true);
    tree.set_alpha(child, 1.0);
    tree.set_alpha(hidden, 0.0);

    let mut drawer = CommandDrawer::new(NullResolver);
    let stats = Compositor::new().draw(&mut tree, &mut drawer);
    assert_eq!(drawer.command_count(), 0);
    assert_eq!(stats.skipped, 1);

    tree.set_alpha(hidden, 1.0);
    tree.set_visible(hidden, false);
    drawer.begin_frame();
    Compositor::new().draw(&mut tree, &mut drawer);
    assert_eq!(drawer.command_count(), 0);

    tree.set_visible(hidden, true);
    drawer.begin_frame();
    Compositor::new().draw(&mut tree, &mut drawer);
    assert_eq!(drawer.command_count(), 2);
}

/// Draws a lazily resolved texture.
struct Flag {
    slot: TextureSlot,
}

impl Widget for Flag {
    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        ctx.texture(&mut self.slot, Color::WHITE);
    }
}

#[test]
fn test_missing_texture_draws_nothing_until_available() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    attach(&mut tree, root, Flag { slot: TextureSlot::new("flags/nl.png") }, Rect::UNIT);
    attach(&mut tree, root, Recorder::new("after", &log(), EventOutcome::Ignore), Rect::UNIT);

    let mut drawer = CommandDrawer::new(MapTextureResolver::new());
    let mut compositor = Compositor::new();
    compositor.draw(&mut tree, &mut drawer);
    // The node after the missing texture still draws.
    assert_eq!(drawer.command_count(), 1);

    drawer.resolver_mut().insert("flags/nl.png", TextureHandle(9));
    drawer.begin_frame();
    compositor.draw(&mut tree, &mut drawer);
    assert!(matches!(
        drawer.commands()[0],
        RenderCommand::Texture { texture: TextureHandle(9), .. }
    ));
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn test_bubbling_skips_non_overlapping_sibling() {
    let log = log();
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let parent = attach(&mut tree, root, Recorder::new("parent", &log, EventOutcome::Handle), Rect::UNIT);
    attach(&mut tree, parent, Recorder::new("left", &log, EventOutcome::Ignore), Rect::new(0.0, 0.0, 0.6, 1.0));
    let top = attach(&mut tree, parent, Recorder::new("top", &log, EventOutcome::Ignore), Rect::new(0.5, 0.0, 0.5, 1.0));
    let mut router = InputRouter::default();

    // Inside only the topmost sibling.
    let outcome = router.dispatch(&mut tree, &MouseEvent::pressed(800.0, 10.0, MouseButton::Left).into());
    assert_eq!(outcome, DispatchOutcome::Handled(parent));
    let entries: Vec<_> = log.borrow().iter().filter(|e| !e.contains("hover")).cloned().collect();
    assert_eq!(entries, vec!["top:Pressed:1", "parent:Pressed:1"]);

    // In the overlap the later sibling wins.
    log.borrow_mut().clear();
    router.dispatch(&mut tree, &MouseEvent::pressed(550.0, 10.0, MouseButton::Right).into());
    assert_eq!(*log.borrow(), vec!["top:Pressed:1", "parent:Pressed:1"]);
    assert_eq!(router.hovered(), Some(top));
}

#[test]
fn test_hover_enter_and_leave() {
    let log = log();
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    attach(&mut tree, root, Recorder::new("a", &log, EventOutcome::Ignore), Rect::new(0.0, 0.0, 0.5, 1.0));
    attach(&mut tree, root, Recorder::new("b", &log, EventOutcome::Ignore), Rect::new(0.5, 0.0, 0.5, 1.0));
    let mut router = InputRouter::default();

    router.dispatch(&mut tree, &MouseEvent::moved(100.0, 10.0).into());
    router.dispatch(&mut tree, &MouseEvent::moved(120.0, 10.0).into());
    router.dispatch(&mut tree, &MouseEvent::moved(900.0, 10.0).into());

    let hovers: Vec<_> = log.borrow().iter().filter(|e| e.contains("hover")).cloned().collect();
    assert_eq!(hovers, vec!["a:hover:true", "a:hover:false", "b:hover:true"]);
}

#[test]
fn test_double_click_detection() {
    let log = log();
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    attach(&mut tree, root, Recorder::new("cell", &log, EventOutcome::Handle), Rect::UNIT);
    let mut router = InputRouter::default();

    router.dispatch(&mut tree, &MouseEvent::pressed(10.0, 10.0, MouseButton::Left).into());
    router.tick(0.1);
    router.dispatch(&mut tree, &MouseEvent::pressed(11.0, 10.0, MouseButton::Left).into());
    router.tick(1.0);
    router.dispatch(&mut tree, &MouseEvent::pressed(11.0, 10.0, MouseButton::Left).into());

    let presses: Vec<_> = log.borrow().iter().filter(|e| e.contains("Pressed")).cloned().collect();
    assert_eq!(presses, vec!["cell:Pressed:1", "cell:Pressed:2", "cell:Pressed:1"]);
}

#[test]
fn test_keyboard_goes_only_to_focus() {
    let log = log();
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let parent = attach(&mut tree, root, Recorder::new("parent", &log, EventOutcome::Handle), Rect::UNIT);
    let field = attach(&mut tree, parent, Recorder::new("field", &log, EventOutcome::Ignore), Rect::UNIT);
    let mut router = InputRouter::default();

    assert_eq!(
        router.dispatch(&mut tree, &KeyEvent::press(Key::A).into()),
        DispatchOutcome::Ignored
    );

    tree.set_focus(Some(field));
    assert_eq!(
        router.dispatch(&mut tree, &KeyEvent::press(Key::A).into()),
        DispatchOutcome::Ignored
    );
    // No bubbling to the handling parent.
    assert_eq!(*log.borrow(), vec!["field:key:A"]);
}

struct PilotPayload(PilotId);

impl DragPayload for PilotPayload {
    fn label(&self) -> &str {
        "pilot"
    }

    fn pilot(&self) -> Option<PilotId> {
        Some(self.0)
    }
}

struct Chip(PilotId);

impl Widget for Chip {
    fn drag_payload(&self) -> Option<Box<dyn DragPayload>> {
        Some(Box::new(PilotPayload(self.0)))
    }
}

struct Slot {
    assigned: Rc<RefCell<Option<PilotId>>>,
}

impl Widget for Slot {
    fn on_drop(&mut self, event: &DropEvent<'_>, _ctx: &mut EventContext<'_>) -> bool {
        match event.payload.pilot() {
            Some(pilot) => {
                *self.assigned.borrow_mut() = Some(pilot);
                true
            }
            None => false,
        }
    }
}

#[test]
fn test_drag_and_drop_by_capability() {
    let assigned = Rc::new(RefCell::new(None));
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let chip = attach(&mut tree, root, Chip(PilotId::new(44)), Rect::new(0.0, 0.0, 0.2, 0.2));
    let slot = attach(
        &mut tree,
        root,
        Slot { assigned: assigned.clone() },
        Rect::new(0.5, 0.5, 0.5, 0.5),
    );
    let mut router = InputRouter::default();

    router.dispatch(&mut tree, &MouseEvent::pressed(10.0, 10.0, MouseButton::Left).into());
    // Under the threshold: still just a press.
    router.dispatch(&mut tree, &MouseEvent::moved(12.0, 10.0).into());
    assert_eq!(router.dragging(), None);

    assert_eq!(
        router.dispatch(&mut tree, &MouseEvent::moved(300.0, 300.0).into()),
        DispatchOutcome::Handled(chip)
    );
    assert_eq!(router.dragging(), Some(chip));

    let outcome = router.dispatch(&mut tree, &MouseEvent::released(700.0, 400.0, MouseButton::Left).into());
    assert_eq!(outcome, DispatchOutcome::Dropped { source: chip, target: slot });
    assert_eq!(*assigned.borrow(), Some(PilotId::new(44)));
    assert_eq!(router.dragging(), None);
}

#[test]
fn test_drop_rejected_and_cancelled() {
    let mut tree = NodeTree::new(viewport());
    let root = tree.root();
    let chip = attach(&mut tree, root, Chip(PilotId::new(7)), Rect::new(0.0, 0.0, 0.2, 0.2));
    let mut router = InputRouter::default();

    router.dispatch(&mut tree, &MouseEvent::pressed(10.0, 10.0, MouseButton::Left).into());
    router.dispatch(&mut tree, &MouseEvent::moved(400.0, 300.0).into());
    assert_eq!(
        router.dispatch(&mut tree, &MouseEvent::released(400.0, 300.0, MouseButton::Left).into()),
        DispatchOutcome::DropRejected { source: chip }
    );

    router.dispatch(&mut tree, &MouseEvent::pressed(10.0, 10.0, MouseButton::Left).into());
    router.dispatch(&mut tree, &MouseEvent::moved(400.0, 300.0).into());
    assert_eq!(
        router.dispatch(&mut tree, &KeyEvent::press(Key::Escape).into()),
        DispatchOutcome::DragCancelled { source: chip }
    );
    assert_eq!(router.dragging(), None);
}

// ============================================================================
// Animation
// ============================================================================

#[test]
fn test_animation_convergence_is_monotonic_and_exact() {
    let mut tree = NodeTree::with_animation(viewport(), AnimationConfig::new(0.25, Easing::ExponentialOut));
    let root = tree.root();
    let node = attach(&mut tree, root, Group, Rect::new(0.0, 0.0, 1.0, 1.0));
    let target = Rect::new(0.05, 0.05, 0.9, 0.9);
    tree.animate_scale(node, 0.9, 0.9, trackside_ui::Anchor::Center);

    let mut last_width = 1.0_f32;
    for _ in 0..60 {
        tree.update(1.0 / 60.0);
        let width = tree.relative_bounds(node).expect("live").width;
        assert!(width <= last_width + 1e-7);
        last_width = width;
    }

    assert!(!tree.is_animating(node));
    let rel = tree.relative_bounds(node).expect("live");
    assert!(rel.approx_eq(&target, 1e-6));
    // Pinned: further updates change nothing.
    tree.update(1.0 / 60.0);
    assert_eq!(tree.relative_bounds(node), Some(rel));
}
