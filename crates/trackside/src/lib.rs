//! # TRACKSIDE
//!
//! Race control screens built on [`trackside_ui`].
//!
//! ```text
//! ┌──────────────┐  DomainEvent   ┌────────────────────────────────────┐
//! │ race control │ ─────────────▶ │ EventChannel (any thread)          │
//! │ lap detector │                └──────────────┬─────────────────────┘
//! └──────────────┘                               │ queued, drained in Update
//!                                                ▼
//! ┌──────────────┐  InputEvent    ┌────────────────────────────────────┐
//! │ host window  │ ─────────────▶ │ FrameLoop: input → update → draw   │
//! └──────────────┘                └──────────────┬─────────────────────┘
//!                                                ▼
//!                                     CommandDrawer batches → GPU
//! ```

#![deny(unsafe_code)]

pub mod board;
pub mod config;
pub mod frame_loop;
pub mod widgets;

pub use board::RaceBoard;
pub use config::{ConfigError, ConfigResult, RotationClock, TracksideConfig};
pub use frame_loop::{FrameLoop, FrameLoopConfig, FrameStats, FrameStatsAccumulator};
