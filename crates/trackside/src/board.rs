//! The race control board: header, pilot pool, heat slots and side panel.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Race 12        LIVE      Laps 4       Best 58.120 Ava        │
//! ├───────────────┬───────────────┬──────────────────────────────┤
//! │ [Ava]         │ 1. empty      │  rotating: next heat / logo  │
//! │ [Kai]   drag→ │ 2. Kai        ├──────────────────────────────┤
//! │ [Mia]         │ 3. empty      │  < Race 12 >                 │
//! │               │               ├──────────────────────────(x)─┤
//! │               │               │  notice card                 │
//! └───────────────┴───────────────┴──────────────────────────────┘
//! ```

use crossbeam_channel::{unbounded, Receiver};
use trackside_shared::{DomainEvent, EventChannel, PilotId, RaceId};
use trackside_ui::{NodeId, NodeTree, Rect, Sizing, Theme, TreeResult, Widget};

use crate::config::TracksideConfig;
use crate::widgets::{
    CloseButton, ImageBox, Label, Panel, PilotChip, PilotSlot, RaceHeader, Rotator, Selection,
    Selector, SlotAssignment,
};

/// Spacing between stacked rows, as a fraction of the column height.
const ROW_SPACING: f32 = 0.02;

/// Node handles of a built board.
#[derive(Debug)]
pub struct RaceBoard {
    /// Full-screen background.
    pub background: NodeId,
    /// Header bound to the race channel.
    pub header: NodeId,
    /// One chip per pilot, top to bottom.
    pub chips: Vec<NodeId>,
    /// Heat slots, top to bottom.
    pub slots: Vec<NodeId>,
    /// Side panel rotator.
    pub rotator: NodeId,
    /// Race picker.
    pub selector: NodeId,
    /// Dismissable notice card.
    pub notice: NodeId,
    /// Close badge on the notice card.
    pub notice_close: NodeId,
    /// Current race picked in the selector.
    pub selected_race: Selection<RaceId>,
    /// Accepted pilot drops.
    pub assignments: Receiver<SlotAssignment>,
}

impl RaceBoard {
    /// Builds the board under the tree root.
    ///
    /// # Errors
    ///
    /// Propagates attach errors. Building into a tree nobody else is touching
    /// does not produce any.
    pub fn build(
        tree: &mut NodeTree,
        channel: &EventChannel<DomainEvent>,
        config: &TracksideConfig,
        theme: &Theme,
        pilots: &[(PilotId, &str)],
        heat_size: usize,
        races: Vec<RaceId>,
    ) -> TreeResult<Self> {
        let root = tree.root();
        let background = add(tree, root, Panel::background(theme), Rect::UNIT)?;

        let header =
            RaceHeader::attach(tree, background, Rect::new(0.0, 0.0, 1.0, 0.1), channel, theme)?;

        let pool = add(tree, background, Panel::surface(theme), Rect::new(0.02, 0.14, 0.3, 0.82))?;
        let mut chips = Vec::with_capacity(pilots.len());
        for (pilot, name) in pilots {
            let chip = PilotChip::new(*pilot, *name, theme);
            chips.push(add(tree, pool, chip, Rect::new(0.05, 0.0, 0.9, 1.0))?);
        }
        tree.align_vertically(ROW_SPACING, &chips);

        let (tx, assignments) = unbounded();
        let heat = add(tree, background, Panel::surface(theme), Rect::new(0.35, 0.14, 0.3, 0.82))?;
        let mut slots = Vec::with_capacity(heat_size);
        for index in 0..heat_size {
            let slot = PilotSlot::new(index, theme).with_assignments(tx.clone());
            slots.push(add(tree, heat, slot, Rect::new(0.05, 0.0, 0.9, 1.0))?);
        }
        tree.align_vertically(ROW_SPACING, &slots);

        let rotator = add(
            tree,
            background,
            Rotator::new(config.rotation_period(), config.rotation.clock),
            Rect::new(0.68, 0.14, 0.3, 0.4),
        )?;
        let next_heat = add(tree, rotator, Panel::surface(theme), Rect::UNIT)?;
        add(tree, next_heat, Label::body("Next heat", theme).with_padding(8.0), Rect::UNIT)?;
        add(
            tree,
            rotator,
            ImageBox::new("sponsor/banner").with_placeholder(theme.surface),
            Rect::UNIT,
        )?;

        let race_picker = Selector::new(races, |race: &RaceId| format!("Race {}", race.raw()), theme);
        let selected_race = race_picker.selection();
        let selector = add(tree, background, race_picker, Rect::new(0.68, 0.58, 0.3, 0.06))?;

        let notice = add(tree, background, Panel::surface(theme), Rect::new(0.68, 0.7, 0.3, 0.2))?;
        add(
            tree,
            notice,
            Label::body("Pilots: drag into a heat slot", theme).with_padding(8.0),
            Rect::UNIT,
        )?;
        tree.layout();
        let notice_close = CloseButton::attach(tree, notice, theme)?;

        tracing::debug!(
            chips = chips.len(),
            slots = slots.len(),
            nodes = tree.len(),
            "race board built"
        );
        Ok(Self {
            background,
            header,
            chips,
            slots,
            rotator,
            selector,
            notice,
            notice_close,
            selected_race,
            assignments,
        })
    }
}

fn add<W: Widget>(
    tree: &mut NodeTree,
    parent: NodeId,
    widget: W,
    relative: Rect,
) -> TreeResult<NodeId> {
    let id = tree.create_with(widget, relative, Sizing::Relative);
    if let Err(err) = tree.add_child(parent, id) {
        tree.dispose(id);
        return Err(err);
    }
    Ok(id)
}
