//! Rotating content: shows one child at a time, advancing on a timer.

use std::time::{Duration, Instant};

use trackside_ui::{NodeId, UpdateContext, Widget};

use crate::config::RotationClock;

/// Cycles through its children, one visible at a time.
///
/// The incoming child fades in using the tree's animation config; the
/// outgoing child is hidden at once so it stops taking input.
#[derive(Debug, Clone)]
pub struct Rotator {
    period: f32,
    clock: RotationClock,
    elapsed: f32,
    started: Instant,
    current: usize,
    shown: Option<NodeId>,
}

impl Rotator {
    /// Creates a rotator switching every `period` seconds.
    #[must_use]
    pub fn new(period: f32, clock: RotationClock) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            clock,
            elapsed: 0.0,
            started: Instant::now(),
            current: 0,
            shown: None,
        }
    }

    /// Index of the child on display.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    fn due(&mut self, dt: f32) -> bool {
        match self.clock {
            RotationClock::Frame => {
                self.elapsed += dt;
                if self.elapsed >= self.period {
                    // Keep the overshoot so the cadence does not drift.
                    self.elapsed %= self.period;
                    return true;
                }
                false
            }
            RotationClock::Wall => {
                let now = Instant::now();
                if now.duration_since(self.started) >= Duration::from_secs_f32(self.period) {
                    self.started = now;
                    return true;
                }
                false
            }
        }
    }

    fn show(&mut self, ctx: &mut UpdateContext<'_>, children: &[NodeId], fade: bool) {
        let next = children[self.current];
        let tree = ctx.tree_mut();
        for &child in children {
            if child != next {
                tree.set_visible(child, false);
            }
        }
        tree.set_visible(next, true);
        if fade {
            tree.set_alpha(next, 0.0);
            tree.animate_alpha(next, 1.0);
        }
        self.shown = Some(next);
        ctx.request_redraw();
    }
}

impl Widget for Rotator {
    fn name(&self) -> &'static str {
        "rotator"
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let children = ctx.children();
        if children.is_empty() {
            self.shown = None;
            return;
        }

        // Children may have come or gone since the last frame.
        if self.current >= children.len() {
            self.current = 0;
        }
        if self.shown != Some(children[self.current]) {
            self.show(ctx, &children, false);
        }

        if self.due(ctx.dt()) && children.len() > 1 {
            self.current = (self.current + 1) % children.len();
            tracing::trace!(index = self.current, "rotating");
            self.show(ctx, &children, true);
        }
    }
}
