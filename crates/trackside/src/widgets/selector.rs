//! Keyboard-driven picker over an arbitrary item list.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use trackside_ui::{
    Color, DrawContext, EventContext, EventOutcome, Key, KeyEvent, MouseEvent, Theme, Widget,
};

/// Current choice of a [`Selector`], readable from outside the tree.
pub struct Selection<T> {
    inner: Arc<Mutex<Option<(usize, T)>>>,
}

impl<T> Clone for Selection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T: Clone> Selection<T> {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected item.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.inner.lock().as_ref().map(|(_, item)| item.clone())
    }

    /// Index of the selected item.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.inner.lock().as_ref().map(|(index, _)| *index)
    }

    fn publish(&self, index: usize, item: T) {
        *self.inner.lock() = Some((index, item));
    }

    fn clear(&self) {
        *self.inner.lock() = None;
    }
}

impl<T> fmt::Debug for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.inner.lock().as_ref().map(|(index, _)| *index);
        f.debug_struct("Selection").field("index", &index).finish()
    }
}

/// Cycles through `items` with the arrow keys while focused.
///
/// A click focuses the selector; clicking its left or right third also
/// steps backwards or forwards. Selection wraps at both ends.
pub struct Selector<T> {
    items: Vec<T>,
    index: usize,
    display: Box<dyn Fn(&T) -> String>,
    selection: Selection<T>,
    focused: bool,
    fill: Color,
    focus_ring: Color,
    text: Color,
    muted: Color,
}

impl<T: Clone + 'static> Selector<T> {
    /// Creates a selector showing each item through `display`.
    #[must_use]
    pub fn new(items: Vec<T>, display: impl Fn(&T) -> String + 'static, theme: &Theme) -> Self {
        let selection = Selection::new();
        if let Some(first) = items.first() {
            selection.publish(0, first.clone());
        }
        Self {
            items,
            index: 0,
            display: Box::new(display),
            selection,
            focused: false,
            fill: theme.surface,
            focus_ring: theme.primary,
            text: theme.text,
            muted: theme.text_muted,
        }
    }

    /// Handle to the current choice.
    #[must_use]
    pub fn selection(&self) -> Selection<T> {
        self.selection.clone()
    }

    /// Moves the selection by `delta`, wrapping. Returns true if it moved.
    fn step(&mut self, delta: isize) -> bool {
        let len = self.items.len();
        if len < 2 {
            return false;
        }
        let len = len as isize;
        // Index fits: it is always below len.
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let next = (self.index as isize + delta).rem_euclid(len) as usize;
        self.select(next)
    }

    fn select(&mut self, index: usize) -> bool {
        if index == self.index {
            return false;
        }
        let Some(item) = self.items.get(index) else {
            return false;
        };
        self.index = index;
        self.selection.publish(index, item.clone());
        true
    }
}

impl<T: Clone + 'static> Widget for Selector<T> {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        let bounds = ctx.bounds();
        ctx.fill_rect(bounds, self.fill, 3.0);
        if self.focused {
            ctx.outline(self.focus_ring, 2.0);
        }

        let y = bounds.y + 4.0;
        ctx.text_at("<", bounds.x + 6.0, y, self.muted, 14.0);
        ctx.text_at(">", bounds.right() - 14.0, y, self.muted, 14.0);
        match self.items.get(self.index) {
            Some(item) => {
                let label = (self.display)(item);
                ctx.text_at(&label, bounds.x + 24.0, y, self.text, 14.0);
            }
            None => ctx.text_at("none", bounds.x + 24.0, y, self.muted, 14.0),
        }
    }

    fn on_mouse(&mut self, event: &MouseEvent, ctx: &mut EventContext<'_>) -> EventOutcome {
        if !event.is_left_press() {
            return EventOutcome::Ignore;
        }
        ctx.focus();
        let bounds = ctx.bounds();
        let third = bounds.width / 3.0;
        let moved = if event.x < bounds.x + third {
            self.step(-1)
        } else if event.x >= bounds.right() - third {
            self.step(1)
        } else {
            false
        };
        if moved {
            ctx.request_redraw();
        }
        EventOutcome::Handle
    }

    fn on_key(&mut self, event: &KeyEvent, ctx: &mut EventContext<'_>) -> EventOutcome {
        if !event.pressed {
            return EventOutcome::Ignore;
        }
        let moved = match event.key {
            Key::Left | Key::Up => self.step(-1),
            Key::Right | Key::Down => self.step(1),
            Key::Home => self.select(0),
            Key::End => self.select(self.items.len().saturating_sub(1)),
            _ => return EventOutcome::Ignore,
        };
        if moved {
            ctx.request_redraw();
        }
        EventOutcome::Handle
    }

    fn on_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn on_dispose(&mut self) {
        self.selection.clear();
    }
}

impl<T> fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("items", &self.items.len())
            .field("index", &self.index)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackside_shared::RaceId;
    use trackside_ui::{
        DispatchOutcome, InputRouter, MouseButton, NodeId, NodeTree, Rect, RouterConfig, Sizing,
    };

    fn setup(items: Vec<RaceId>) -> (NodeTree, NodeId, Selection<RaceId>) {
        let mut tree = NodeTree::new(Rect::new(0.0, 0.0, 300.0, 30.0));
        let selector = Selector::new(items, |race: &RaceId| format!("Race {}", race.raw()), &Theme::DARK);
        let selection = selector.selection();
        let id = tree.create_with(selector, Rect::UNIT, Sizing::Relative);
        tree.add_child(tree.root(), id).expect("attach");
        tree.layout();
        (tree, id, selection)
    }

    fn press(router: &mut InputRouter, tree: &mut NodeTree, key: Key) -> DispatchOutcome {
        router.dispatch(tree, &KeyEvent::press(key).into())
    }

    #[test]
    fn test_keys_need_focus() {
        let (mut tree, id, selection) = setup((1..=3).map(RaceId::new).collect());
        let mut router = InputRouter::new(RouterConfig::default());
        assert_eq!(selection.get(), Some(RaceId::new(1)));

        assert_eq!(press(&mut router, &mut tree, Key::Right), DispatchOutcome::Ignored);
        assert_eq!(selection.index(), Some(0));

        tree.set_focus(Some(id));
        assert_eq!(press(&mut router, &mut tree, Key::Right), DispatchOutcome::Handled(id));
        assert_eq!(selection.get(), Some(RaceId::new(2)));
    }

    #[test]
    fn test_wraps_both_ways() {
        let (mut tree, id, selection) = setup((1..=3).map(RaceId::new).collect());
        let mut router = InputRouter::new(RouterConfig::default());
        tree.set_focus(Some(id));

        press(&mut router, &mut tree, Key::Left);
        assert_eq!(selection.get(), Some(RaceId::new(3)));
        press(&mut router, &mut tree, Key::Down);
        assert_eq!(selection.get(), Some(RaceId::new(1)));
        press(&mut router, &mut tree, Key::End);
        assert_eq!(selection.index(), Some(2));
        press(&mut router, &mut tree, Key::Home);
        assert_eq!(selection.index(), Some(0));

        assert_eq!(press(&mut router, &mut tree, Key::Q), DispatchOutcome::Ignored);
    }

    #[test]
    fn test_click_focuses_and_steps() {
        let (mut tree, id, selection) = setup((1..=3).map(RaceId::new).collect());
        let mut router = InputRouter::new(RouterConfig::default());

        router.dispatch(&mut tree, &MouseEvent::pressed(150.0, 15.0, MouseButton::Left).into());
        assert_eq!(tree.focus(), Some(id));
        assert_eq!(selection.index(), Some(0));

        router.tick(1.0);
        router.dispatch(&mut tree, &MouseEvent::pressed(290.0, 15.0, MouseButton::Left).into());
        assert_eq!(selection.index(), Some(1));
    }

    #[test]
    fn test_empty_and_disposed() {
        let (mut tree, id, selection) = setup(Vec::new());
        assert_eq!(selection.get(), None);
        tree.set_focus(Some(id));
        let mut router = InputRouter::new(RouterConfig::default());
        assert_eq!(press(&mut router, &mut tree, Key::Right), DispatchOutcome::Handled(id));
        assert_eq!(selection.get(), None);

        let (mut tree, id, selection) = setup(vec![RaceId::new(5)]);
        tree.dispose(id);
        assert_eq!(selection.get(), None);
    }
}
