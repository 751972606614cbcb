//! # TRACKSIDE Shared
//!
//! Types used by the timing backend and by the screen widgets.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on rendering code. Domain collaborators
//! (race control, pilot registry, lap detection) only know these types;
//! widgets subscribe to them through [`EventChannel`].

#![deny(unsafe_code)]

pub mod events;
pub mod ids;

pub use events::{DirtyFlag, DomainEvent, EventChannel, EventKind, Subscription};
pub use ids::{PilotId, RaceId};
