//! # Trackside UI Composition Engine
//!
//! Retained-mode node tree behind the race-timing screens.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        FRAME                               │
//! ├────────────────────────────────────────────────────────────┤
//! │  Update:  animations → widget.update (structural changes    │
//! │           deferred until the pass unwinds)                 │
//! │  Draw:    layout (dirty only) → depth-first draw with      │
//! │           accumulated alpha → Drawer → batches → vertices  │
//! │  Input:   hit test (topmost first) → bubble leaf to root   │
//! │           → focus / drag & drop                            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on one thread. Domain events from other threads reach
//! widgets through [`trackside_shared::EventChannel`] flags or queues drained
//! during Update.

#![deny(unsafe_code)]

pub mod animation;
pub mod compositor;
pub mod error;
pub mod input;
pub mod layout;
pub mod node;
pub mod render;
pub mod router;
pub mod style;
pub mod texture;
pub mod widget;

pub use animation::{Animation, AnimationConfig, BoundsAnimation, Easing};
pub use compositor::{Compositor, DrawStats};
pub use error::{TreeError, TreeResult};
pub use input::{
    ButtonState, DispatchOutcome, DragPayload, DropEvent, InputEvent, Key, KeyEvent, Modifiers,
    MouseButton, MouseEvent,
};
pub use layout::{distribute, resolve, Anchor, Rect, Sizing, Span};
pub use node::{NodeFlags, NodeId};
pub use render::{tessellate, CommandDrawer, Drawer, RenderCommand, UIBatch, UIVertex};
pub use router::{InputRouter, RouterConfig};
pub use style::{Color, Theme};
pub use texture::{MapTextureResolver, NullResolver, TextureHandle, TextureResolver, TextureSlot};
pub use widget::{DrawContext, EventContext, EventOutcome, Group, NodeTree, UpdateContext, Widget};
