//! Merge Fall (workspace facade crate).
//!
//! A falling-block merge puzzle for the terminal. The rules live in
//! `merge_fall_core`; this package re-exports the workspace crates under one
//! name and adds the terminal frontend and runtime settings.

pub mod frontend;
pub mod settings;

pub use merge_fall_core as core;
pub use merge_fall_input as input;
pub use merge_fall_term as term;
pub use merge_fall_types as types;
