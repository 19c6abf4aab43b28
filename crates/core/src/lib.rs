//! Core game logic - pure, deterministic, and testable
//!
//! This crate holds every rule of the merge puzzle: the grid, spawning,
//! gravity, merging, scoring and pacing. It does no I/O; presentation layers
//! observe it through the [`GameEvent`](types::GameEvent) queue or the
//! [`GameSnapshot`] view.
//!
//! - **Deterministic**: the same [`GameConfig`] (seed included) and the same
//!   sequence of calls produce the same game.
//! - **Clock-driven**: the game owns a simulation clock advanced by
//!   [`Game::update`]; no wall time is read.
//!
//! # Module Structure
//!
//! - [`grid`]: fixed-size well of blocks and its scan order
//! - [`game`]: the tick state machine, player intents and event queue
//! - [`events`]: presentation callbacks and event dispatch
//! - [`rng`]: seeded spawn value selection
//! - [`scoring`]: merge values and score-driven fall speed
//! - [`config`]: construction parameters and their validation
//! - [`snapshot`]: read-only view for renderers
//!
//! # Rules
//!
//! - A new block carrying the previewed value appears at the top center.
//! - The player may slide it sideways or drop it until it comes to rest.
//! - Each tick, resting blocks first absorb equal neighbours (left, right,
//!   then below), doubling once per neighbour and scoring the result.
//! - A tick with merges moves nothing; otherwise every unsupported block
//!   falls one row. A tick with neither spawns the next block.
//! - The game ends when the spawn cell is taken.
//!
//! # Example
//!
//! ```
//! use merge_fall_core::{Game, GameConfig};
//! use merge_fall_types::{Direction, GameAction};
//!
//! let mut game = Game::new(GameConfig::default().with_seed(7)).unwrap();
//! game.apply_action(GameAction::Start);
//! game.slide(Direction::Left);
//! game.hard_drop();
//!
//! // Drops count as a fall tick and switch to the fast delay.
//! assert_eq!(game.fall_count(), 1);
//! assert_eq!(game.next_fall_at_ms(), Some(175));
//!
//! for event in game.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod config;
pub mod events;
pub mod game;
pub mod grid;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use merge_fall_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GameConfig};
pub use events::{dispatch, EventSink};
pub use game::{Game, TickOutcome};
pub use grid::Grid;
pub use rng::{SimpleRng, ValueQueue};
pub use snapshot::{CellSnapshot, GameSnapshot};
