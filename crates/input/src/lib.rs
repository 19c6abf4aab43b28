//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`crate::types::GameAction`] and turns pointer drags into
//! slide/drop intents with [`SwipeTracker`].

pub mod map;
pub mod swipe;

pub use merge_fall_types as types;

pub use map::{handle_key_event, should_quit};
pub use swipe::{SwipeTracker, DEFAULT_SWIPE_THRESHOLD};
