//! Race-timing widgets.
//!
//! Each widget is a thin [`trackside_ui::Widget`] implementation. Assemblies
//! that need more than one node (a close badge on a card, a header bound to
//! the race channel) come with an `attach` constructor that builds and
//! parents the nodes.

mod close_button;
mod panel;
mod pilot;
mod race_header;
mod rotator;
mod selector;

pub use close_button::CloseButton;
pub use panel::{ImageBox, Label, Panel};
pub use pilot::{PilotChip, PilotPayload, PilotSlot, SlotAssignment};
pub use race_header::{format_lap, RaceHeader};
pub use rotator::Rotator;
pub use selector::{Selection, Selector};
