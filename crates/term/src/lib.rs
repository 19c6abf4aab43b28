//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: views draw into a plain
//! framebuffer, and [`TerminalRenderer`] flushes it to the terminal with
//! row-run diffing. No widget toolkit, so cell aspect ratio stays under our
//! control (a board cell spans several columns and rows).

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use merge_fall_core as core;
pub use merge_fall_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{value_style, GameView, Ghost, ViewEffects, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
