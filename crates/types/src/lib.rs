//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, so they can be used
//! by the simulation, the terminal view and input mapping alike.
//!
//! # Grid Dimensions
//!
//! The default playfield is a narrow well:
//!
//! - **Width**: 5 columns (indexed 0-4)
//! - **Height**: 7 rows (indexed 0-6, row 0 at the top)
//! - **Spawn position**: row 0, column `width / 2`
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FAST_DELAY_MS` | 175 | Tick interval during merge chains and after a drop |
//! | `BASE_BPM` | 100 | Fall tempo at score 0 (600ms per row) |
//! | `BPM_RANGE` | 200 | Tempo gained over `BPM_SCORE_SPAN` points |
//! | `BPM_SCORE_SPAN` | 200000 | Score at which the tempo reaches 300 BPM |
//!
//! # Values
//!
//! Spawned values are powers of two no larger than `MAX_START_VALUE` (2^32).
//! Merges double a value per absorbed neighbour and stop at `MAX_BLOCK_VALUE`
//! (2^63).
//!
//! # Examples
//!
//! ```
//! use merge_fall_types::{Direction, GameAction, Phase, DEFAULT_HEIGHT, DEFAULT_WIDTH};
//!
//! assert_eq!(Direction::Left.offset(), -1);
//! assert_eq!(Direction::from_offset(1), Some(Direction::Right));
//!
//! let action = GameAction::from_str("slideLeft").unwrap();
//! assert_eq!(action, GameAction::Slide(Direction::Left));
//!
//! assert!(Phase::PlayerControl.accepts_intents());
//! assert_eq!((DEFAULT_WIDTH, DEFAULT_HEIGHT), (5, 7));
//! ```

/// Default grid width in cells
pub const DEFAULT_WIDTH: u8 = 5;

/// Default grid height in cells
pub const DEFAULT_HEIGHT: u8 = 7;

/// Largest accepted grid dimension on either axis
pub const MAX_DIMENSION: u8 = 32;

/// Fixed tick interval used while a merge chain settles and after a drop
pub const FAST_DELAY_MS: u32 = 175;

/// Values a freshly spawned block can carry (uniformly chosen)
pub const START_VALUES: [u64; 6] = [2, 4, 8, 16, 32, 64];

/// Largest accepted start value (2^32)
pub const MAX_START_VALUE: u64 = 1 << 32;

/// Ceiling for merged values; doubling past it saturates
pub const MAX_BLOCK_VALUE: u64 = 1 << 63;

/// Fall tempo at score 0, in beats (rows) per minute
pub const BASE_BPM: f64 = 100.0;

/// Tempo gained after `BPM_SCORE_SPAN` points
pub const BPM_RANGE: f64 = 200.0;

/// Score span over which `BPM_RANGE` is gained (linear)
pub const BPM_SCORE_SPAN: f64 = 200_000.0;

/// Largest value with its own colour in views; bigger values share one style
pub const MAX_STYLED_VALUE: u64 = 2048;

/// Lateral slide direction for the player-controlled block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Column offset: -1 for left, +1 for right
    pub fn offset(&self) -> i8 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    /// Parse a raw column offset. Only -1 and +1 are directions.
    ///
    /// ```
    /// use merge_fall_types::Direction;
    ///
    /// assert_eq!(Direction::from_offset(-1), Some(Direction::Left));
    /// assert_eq!(Direction::from_offset(0), None);
    /// assert_eq!(Direction::from_offset(2), None);
    /// ```
    pub fn from_offset(offset: i8) -> Option<Self> {
        match offset {
            -1 => Some(Direction::Left),
            1 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Discrete player intents
///
/// These are produced by the input layer and fed to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Start a game from the idle or game-over screen
    Start,
    /// Move the controlled block one column
    Slide(Direction),
    /// Hard-drop the controlled block to the lowest free cell below it
    Drop,
    /// Toggle pause state
    Pause,
    /// Restart the game at any time
    Restart,
}

impl GameAction {
    /// Parse action from its camelCase name (case-insensitive)
    ///
    /// ```
    /// use merge_fall_types::{Direction, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("drop"), Some(GameAction::Drop));
    /// assert_eq!(GameAction::from_str("SLIDERIGHT"), Some(GameAction::Slide(Direction::Right)));
    /// assert_eq!(GameAction::from_str("rotate"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "start" => Some(GameAction::Start),
            "slideleft" => Some(GameAction::Slide(Direction::Left)),
            "slideright" => Some(GameAction::Slide(Direction::Right)),
            "drop" => Some(GameAction::Drop),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Start => "start",
            GameAction::Slide(Direction::Left) => "slideLeft",
            GameAction::Slide(Direction::Right) => "slideRight",
            GameAction::Drop => "drop",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

/// Simulation phase
///
/// - **Idle**: no game running (before the first start, or after a reset)
/// - **PlayerControl**: the last spawned block can still be slid or dropped
/// - **Falling**: gravity is settling blocks nobody controls
/// - **Merging**: the last tick resolved at least one merge
/// - **GameOver**: the spawn cell was occupied; only a reset leaves this phase
///
/// There is no spawning phase: `spawn_block` places the block and moves to
/// `PlayerControl` (or `GameOver`) in one call, so no caller can observe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    PlayerControl,
    Falling,
    Merging,
    GameOver,
}

impl Phase {
    /// Whether a game is in progress (the fall clock runs)
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::PlayerControl | Phase::Falling | Phase::Merging)
    }

    /// Whether slide and drop intents have an effect
    pub fn accepts_intents(&self) -> bool {
        matches!(self, Phase::PlayerControl)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PlayerControl => "playerControl",
            Phase::Falling => "falling",
            Phase::Merging => "merging",
            Phase::GameOver => "gameOver",
        }
    }
}

/// Stable identity of a spawned block, for adapters that track visuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

/// Grid coordinates, row 0 at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A numbered block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: BlockId,
    /// Always a power of two, at least 2
    pub value: u64,
    pub pos: Position,
    /// Tick counter value at the last downward move (or spawn)
    pub last_fall: u32,
    /// Set once the block has been consumed by a merge
    pub merging: bool,
}

impl Block {
    pub fn new(id: BlockId, value: u64, pos: Position, last_fall: u32) -> Self {
        Self {
            id,
            value,
            pos,
            last_fall,
            merging: false,
        }
    }
}

/// Whether `value` is a legal block value (power of two, at least 2)
///
/// ```
/// use merge_fall_types::is_block_value;
///
/// assert!(is_block_value(2));
/// assert!(is_block_value(4096));
/// assert!(!is_block_value(1));
/// assert!(!is_block_value(6));
/// ```
pub fn is_block_value(value: u64) -> bool {
    value >= 2 && value.is_power_of_two()
}

/// State change reported by the simulation, in mutation order.
///
/// Each variant maps onto one presentation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A block was spawned
    BlockCreated(Block),
    /// A block moved; `merge` is set when it was consumed into the block at
    /// its new position
    BlockPlaced { block: Block, merge: bool },
    /// A block is gone for good (merge cleanup or reset)
    BlockRemoved(Block),
    /// A block's value changed
    ValueChanged(Block),
    ScoreChanged { score: u64 },
    NextValueChanged { value: u64 },
    /// Short visual cue on the surviving block of a merge
    Bounce(Block),
    /// The single tick timer was (re)armed
    NextFallScheduled { delay_ms: u32 },
    GameOver { score: u64 },
}
