//! Game module - the grid simulation
//!
//! Owns the grid, the spawn/fall/merge state machine, scoring and pacing.
//! Every visible change is queued as a [`GameEvent`] right after the mutation
//! that caused it; adapters drain the queue between calls.
//!
//! Time is a simulation clock advanced by [`Game::update`]. The game keeps a
//! single "next fall" deadline on that clock; re-arming it replaces the old
//! deadline, so there is never more than one pending tick.

use arrayvec::ArrayVec;
use log::{debug, info, trace};

use crate::config::{ConfigError, GameConfig};
use crate::events::{dispatch, EventSink};
use crate::grid::{bottom_up, Grid};
use crate::rng::ValueQueue;
use crate::scoring::{fall_delay_ms, merged_value};
use crate::snapshot::{CellSnapshot, GameSnapshot};
use crate::types::*;

/// Merge candidates relative to a resting block, in priority order:
/// left, right, below.
const MERGE_NEIGHBOURS: [(i8, i8); 3] = [(0, -1), (0, 1), (1, 0)];

/// What a single [`Game::step_falling`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No game running (idle, paused by phase, or over)
    Skipped,
    /// At least one merge resolved; nothing fell this tick
    Merged,
    /// At least one block moved down one row
    Fell,
    /// The board was stable and a new block spawned
    Spawned,
    /// The board was stable but the spawn cell was taken
    GameOver,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    values: ValueQueue,
    phase: Phase,
    paused: bool,
    /// Position of the player-controlled block, if any
    last_spawned: Option<Position>,
    /// Blocks absorbed by a merge whose removal has not been reported yet
    pending_removals: Vec<Block>,
    events: Vec<GameEvent>,
    next_block_id: u32,
    fall_count: u32,
    fall_delay_ms: u32,
    fast_mode: bool,
    score: u64,
    next_value: u64,
    clock_ms: u64,
    next_fall_at_ms: Option<u64>,
    config: GameConfig,
}

impl Game {
    /// Create an idle game. Fails if `config` does not validate.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: GameConfig) -> Self {
        let mut values = ValueQueue::new(config.seed, &config.start_values);
        let next_value = values.draw();

        Self {
            grid: Grid::new(config.width, config.height),
            values,
            phase: Phase::Idle,
            paused: false,
            last_spawned: None,
            pending_removals: Vec::new(),
            events: Vec::with_capacity(64),
            next_block_id: 1,
            fall_count: 0,
            fall_delay_ms: fall_delay_ms(0),
            fast_mode: false,
            score: 0,
            next_value,
            clock_ms: 0,
            next_fall_at_ms: None,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn width(&self) -> u8 {
        self.grid.width()
    }

    pub fn height(&self) -> u8 {
        self.grid.height()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn next_value(&self) -> u64 {
        self.next_value
    }

    pub fn fall_count(&self) -> u32 {
        self.fall_count
    }

    pub fn fall_delay_ms(&self) -> u32 {
        self.fall_delay_ms
    }

    pub fn fast_mode(&self) -> bool {
        self.fast_mode
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Clock time at which the next automatic tick runs
    pub fn next_fall_at_ms(&self) -> Option<u64> {
        self.next_fall_at_ms
    }

    /// The block the player currently controls
    pub fn last_spawned(&self) -> Option<&Block> {
        self.last_spawned.and_then(|pos| self.grid.at(pos))
    }

    /// Absorbed blocks still waiting for their removal report
    pub fn pending_removals(&self) -> &[Block] {
        &self.pending_removals
    }

    /// Block at `(row, col)`; anything outside the grid reads as empty
    pub fn block(&self, row: i8, col: i8) -> Option<&Block> {
        self.grid.get(row, col)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.grid.blocks()
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Deliver queued events to `sink` in the order they happened
    pub fn drain_events_into(&mut self, sink: &mut impl EventSink) {
        for event in self.events.drain(..) {
            dispatch(&event, sink);
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.cells.clear();
        for row in 0..self.grid.height() {
            for col in 0..self.grid.width() {
                let cell = self
                    .grid
                    .at(Position::new(row, col))
                    .map(|b| CellSnapshot {
                        id: b.id,
                        value: b.value,
                    });
                out.cells.push(cell);
            }
        }
        out.active = self.last_spawned;
        out.phase = self.phase;
        out.paused = self.paused;
        out.score = self.score;
        out.next_value = self.next_value;
        out.fall_count = self.fall_count;
        out.fall_delay_ms = self.fall_delay_ms;
        out.fast_mode = self.fast_mode;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear the board and every counter, leaving the game idle.
    pub fn reset(&mut self) {
        self.flush_pending_removals();
        for block in self.grid.drain() {
            self.events.push(GameEvent::BlockRemoved(block));
        }

        self.last_spawned = None;
        self.fast_mode = false;
        self.fall_count = 0;
        self.paused = false;
        self.next_fall_at_ms = None;
        self.phase = Phase::Idle;

        self.score = 0;
        self.emit(GameEvent::ScoreChanged { score: 0 });

        self.update_falling_speed();
        self.make_next_value();
        debug!("game reset");
    }

    /// Reset and spawn the first block
    pub fn start_game(&mut self) {
        self.reset();
        info!(
            "starting {}x{} game (rng state {})",
            self.grid.width(),
            self.grid.height(),
            self.values.seed()
        );
        self.spawn_block();
    }

    fn make_next_value(&mut self) {
        self.next_value = self.values.draw();
        self.emit(GameEvent::NextValueChanged {
            value: self.next_value,
        });
    }

    /// Place a block carrying `next_value` at the spawn cell.
    ///
    /// If the spawn cell is taken the game is over and nothing is placed.
    /// Returns whether a block was spawned.
    pub fn spawn_block(&mut self) -> bool {
        if self.phase == Phase::GameOver {
            return false;
        }

        let pos = self.grid.spawn_position();
        if self.grid.is_occupied(pos) {
            self.phase = Phase::GameOver;
            self.last_spawned = None;
            self.next_fall_at_ms = None;
            info!("game over: spawn cell taken, final score {}", self.score);
            self.emit(GameEvent::GameOver { score: self.score });
            return false;
        }

        let id = BlockId(self.next_block_id);
        self.next_block_id = self.next_block_id.wrapping_add(1);

        let block = Block::new(id, self.next_value, pos, self.fall_count);
        self.grid.insert(block);
        self.last_spawned = Some(pos);
        self.phase = Phase::PlayerControl;
        debug!("spawned block {} with value {}", id.0, block.value);
        self.emit(GameEvent::BlockCreated(block));

        self.set_next_fall(self.fall_delay_ms);
        self.make_next_value();
        true
    }

    /// Re-arm the single tick timer `delay_ms` from now
    fn set_next_fall(&mut self, delay_ms: u32) {
        self.next_fall_at_ms = Some(self.clock_ms + delay_ms as u64);
        self.emit(GameEvent::NextFallScheduled { delay_ms });
    }

    fn intents_enabled(&self) -> bool {
        self.phase.accepts_intents() && !self.paused
    }

    /// Move the controlled block one column, if that cell is free.
    pub fn slide(&mut self, direction: Direction) -> bool {
        if !self.intents_enabled() {
            return false;
        }
        let Some(pos) = self.last_spawned else {
            return false;
        };

        let col = pos.col as i8 + direction.offset();
        if !self.grid.is_free(pos.row as i8, col) {
            return false;
        }

        self.move_block(pos, Position::new(pos.row, col as u8), None);
        true
    }

    /// Drop the controlled block to the lowest free cell below it.
    ///
    /// Counts as a fall tick even when the block is already resting.
    /// Returns whether the block moved.
    pub fn hard_drop(&mut self) -> bool {
        if !self.intents_enabled() {
            return false;
        }
        let Some(pos) = self.last_spawned else {
            return false;
        };

        self.fall_count += 1;

        let Some(row) = self.grid.landing_row(pos) else {
            return false;
        };

        self.move_block(pos, Position::new(row, pos.col), Some(self.fall_count));
        self.set_next_fall(self.config.fast_delay_ms);
        true
    }

    /// Whether the block at `pos` could move down one row
    pub fn can_fall(&self, pos: Position) -> bool {
        self.grid.can_fall(pos)
    }

    /// Equal-valued neighbours of the block at `pos` that may merge into it.
    ///
    /// A neighbour that fell more recently than the block is still in motion
    /// for this frame and is skipped.
    pub fn mergeable_neighbors(&self, pos: Position) -> ArrayVec<Position, 3> {
        let mut out = ArrayVec::new();
        let Some(block) = self.grid.at(pos) else {
            return out;
        };

        for (dr, dc) in MERGE_NEIGHBOURS {
            let row = pos.row as i8 + dr;
            let col = pos.col as i8 + dc;
            if let Some(n) = self.grid.get(row, col) {
                if n.value == block.value && n.last_fall <= block.last_fall {
                    out.push(n.pos);
                }
            }
        }
        out
    }

    /// Absorb every mergeable neighbour into the block at `pos`.
    fn check_merge(&mut self, pos: Position) -> bool {
        let neighbours = self.mergeable_neighbors(pos);
        if neighbours.is_empty() {
            return false;
        }

        for &from in &neighbours {
            self.absorb(from, pos);
        }

        let Some(block) = self.grid.at_mut(pos) else {
            return true;
        };
        block.value = merged_value(block.value, neighbours.len());
        let block = *block;

        self.score = self.score.saturating_add(block.value);
        self.update_falling_speed();
        debug!(
            "merged {} block(s) into ({}, {}) -> {}, score {}",
            neighbours.len(),
            pos.row,
            pos.col,
            block.value,
            self.score
        );

        self.emit(GameEvent::ValueChanged(block));
        self.emit(GameEvent::ScoreChanged { score: self.score });
        self.emit(GameEvent::Bounce(block));
        true
    }

    fn move_block(&mut self, from: Position, to: Position, last_fall: Option<u32>) {
        let Some(mut block) = self.grid.take(from) else {
            return;
        };
        block.pos = to;
        if let Some(tick) = last_fall {
            block.last_fall = tick;
        }

        let placed = self.grid.insert(block);
        debug_assert!(placed, "moved block onto an occupied cell");

        if self.last_spawned == Some(from) {
            self.last_spawned = Some(to);
        }
        self.emit(GameEvent::BlockPlaced { block, merge: false });
    }

    /// Take the block at `from` off the grid as consumed by the block at `into`.
    fn absorb(&mut self, from: Position, into: Position) {
        let Some(mut block) = self.grid.take(from) else {
            return;
        };
        block.pos = into;
        block.merging = true;

        if self.last_spawned == Some(from) {
            self.last_spawned = None;
        }
        self.pending_removals.push(block);
        self.emit(GameEvent::BlockPlaced { block, merge: true });
    }

    fn flush_pending_removals(&mut self) {
        for block in self.pending_removals.drain(..) {
            self.events.push(GameEvent::BlockRemoved(block));
        }
    }

    /// Report an absorbed block as removed before the next tick does.
    ///
    /// Adapters call this when the merge animation of `id` has finished.
    /// Returns false if `id` is not waiting for removal.
    pub fn block_moved(&mut self, id: BlockId) -> bool {
        let Some(idx) = self.pending_removals.iter().position(|b| b.id == id) else {
            return false;
        };
        let block = self.pending_removals.remove(idx);
        self.emit(GameEvent::BlockRemoved(block));
        true
    }

    fn update_falling_speed(&mut self) {
        self.fall_delay_ms = fall_delay_ms(self.score);
    }

    /// Run one gravity tick.
    ///
    /// Merges are resolved first; if any happened, nothing falls this tick.
    /// Otherwise every block with a free cell below moves down one row. When
    /// nothing merges and nothing moves the board is stable and the next
    /// block spawns.
    pub fn step_falling(&mut self) -> TickOutcome {
        if !self.phase.is_running() {
            return TickOutcome::Skipped;
        }

        self.fall_count += 1;
        self.flush_pending_removals();

        let (width, height) = (self.grid.width(), self.grid.height());

        let mut merged = false;
        for pos in bottom_up(width, height) {
            if !self.grid.is_occupied(pos) || self.grid.can_fall(pos) {
                continue;
            }
            if self.last_spawned == Some(pos) {
                self.last_spawned = None;
            }
            if self.check_merge(pos) {
                merged = true;
            }
        }

        if merged {
            self.fast_mode = true;
            self.phase = Phase::Merging;
            self.set_next_fall(self.config.fast_delay_ms);
            trace!("tick {}: merged", self.fall_count);
            return TickOutcome::Merged;
        }

        let mut moved = false;
        for pos in bottom_up(width, height) {
            if self.grid.is_occupied(pos) && self.grid.can_fall(pos) {
                let below = Position::new(pos.row + 1, pos.col);
                self.move_block(pos, below, Some(self.fall_count));
                moved = true;
            }
        }

        if moved {
            self.phase = if self.last_spawned.is_some() {
                Phase::PlayerControl
            } else {
                Phase::Falling
            };
            let delay = if self.fast_mode {
                self.config.fast_delay_ms
            } else {
                self.fall_delay_ms
            };
            self.set_next_fall(delay);
            trace!("tick {}: fell", self.fall_count);
            return TickOutcome::Fell;
        }

        self.fast_mode = false;
        if self.spawn_block() {
            TickOutcome::Spawned
        } else {
            TickOutcome::GameOver
        }
    }

    /// Advance the clock and run the tick if it came due.
    ///
    /// At most one tick runs per call. Nothing happens while idle, paused or
    /// after game over.
    pub fn update(&mut self, elapsed_ms: u32) -> Option<TickOutcome> {
        if self.paused || !self.phase.is_running() {
            return None;
        }

        self.clock_ms += elapsed_ms as u64;
        match self.next_fall_at_ms {
            Some(due) if self.clock_ms >= due => {
                self.next_fall_at_ms = None;
                Some(self.step_falling())
            }
            _ => None,
        }
    }

    /// Pause or resume a running game
    pub fn toggle_pause(&mut self) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        self.paused = !self.paused;
        info!("game {}", if self.paused { "paused" } else { "resumed" });
        true
    }

    /// Apply a player intent; returns whether it had an effect
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Start => {
                if self.phase.is_running() {
                    return false;
                }
                self.start_game();
                true
            }
            GameAction::Slide(direction) => self.slide(direction),
            GameAction::Drop => self.hard_drop(),
            GameAction::Pause => self.toggle_pause(),
            GameAction::Restart => {
                self.start_game();
                true
            }
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::from_valid(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(width: u8, height: u8) -> Game {
        Game::new(GameConfig::with_size(width, height)).unwrap()
    }

    /// A running game with nothing on the board and no controlled block.
    fn settled_game(width: u8, height: u8) -> Game {
        let mut g = game(width, height);
        g.phase = Phase::Falling;
        g
    }

    fn put(g: &mut Game, row: u8, col: u8, value: u64, last_fall: u32) -> Position {
        let pos = Position::new(row, col);
        let id = BlockId(g.next_block_id);
        g.next_block_id += 1;
        assert!(g.grid.insert(Block::new(id, value, pos, last_fall)));
        pos
    }

    fn value_at(g: &Game, row: i8, col: i8) -> Option<u64> {
        g.block(row, col).map(|b| b.value)
    }

    #[test]
    fn test_new_game_is_idle() {
        let g = game(5, 7);
        assert_eq!(g.phase(), Phase::Idle);
        assert_eq!(g.grid().block_count(), 0);
        assert_eq!(g.fall_delay_ms(), 600);
        assert!(START_VALUES.contains(&g.next_value()));
        assert!(g.events().is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(Game::new(GameConfig::with_size(0, 7)).is_err());
    }

    #[test]
    fn test_start_game_spawns_top_center() {
        let mut g = game(5, 7);
        g.reset();
        let first = g.next_value();
        assert!(g.spawn_block());

        let block = g.last_spawned().copied().unwrap();
        assert_eq!(block.pos, Position::new(0, 2));
        assert_eq!(block.value, first);
        assert_eq!(g.phase(), Phase::PlayerControl);
        assert_eq!(g.next_fall_at_ms(), Some(600));

        let tail: Vec<GameEvent> = g.drain_events().rev().take(3).collect();
        assert!(matches!(tail[0], GameEvent::NextValueChanged { .. }));
        assert_eq!(tail[1], GameEvent::NextFallScheduled { delay_ms: 600 });
        assert_eq!(tail[2], GameEvent::BlockCreated(block));
    }

    #[test]
    fn test_spawn_blocked_is_game_over_without_mutation() {
        let mut g = settled_game(5, 7);
        put(&mut g, 0, 2, 8, 0);
        let before = g.grid().clone();
        let next = g.next_value();

        assert!(!g.spawn_block());
        assert_eq!(g.phase(), Phase::GameOver);
        assert_eq!(g.grid(), &before);
        assert_eq!(g.next_value(), next);
        assert_eq!(g.events(), &[GameEvent::GameOver { score: 0 }]);

        // Stays over until reset.
        assert!(!g.spawn_block());
        assert_eq!(g.step_falling(), TickOutcome::Skipped);
    }

    #[test]
    fn test_slide_respects_bounds_and_neighbours() {
        let mut g = game(5, 7);
        g.start_game();

        assert!(g.slide(Direction::Left));
        assert!(g.slide(Direction::Left));
        assert!(!g.slide(Direction::Left), "left wall");
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(0, 0));

        put(&mut g, 0, 1, 2, 0);
        assert!(!g.slide(Direction::Right), "occupied target");
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(0, 0));
    }

    #[test]
    fn test_slide_does_not_touch_timing() {
        let mut g = game(5, 7);
        g.start_game();
        let (count, due) = (g.fall_count(), g.next_fall_at_ms());

        assert!(g.slide(Direction::Right));
        assert_eq!(g.fall_count(), count);
        assert_eq!(g.next_fall_at_ms(), due);
    }

    #[test]
    fn test_slide_without_active_block_is_ignored() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 2, 2, 0);
        assert!(!g.slide(Direction::Left));
        assert_eq!(value_at(&g, 6, 2), Some(2));
    }

    #[test]
    fn test_hard_drop_lands_on_stack() {
        let mut g = game(5, 7);
        g.start_game();
        put(&mut g, 6, 2, 64, 0);
        put(&mut g, 5, 2, 32, 0);
        g.drain_events().for_each(drop);

        assert!(g.hard_drop());
        let block = *g.last_spawned().unwrap();
        assert_eq!(block.pos, Position::new(4, 2));
        assert_eq!(g.fall_count(), 1);
        assert_eq!(block.last_fall, 1);
        assert_eq!(g.next_fall_at_ms(), Some(g.clock_ms() + 175));
        assert!(g
            .events()
            .contains(&GameEvent::NextFallScheduled { delay_ms: 175 }));
    }

    #[test]
    fn test_hard_drop_when_resting_only_counts() {
        let mut g = game(5, 7);
        g.start_game();
        put(&mut g, 1, 2, 64, 0);
        let due = g.next_fall_at_ms();

        assert!(!g.hard_drop());
        assert_eq!(g.fall_count(), 1);
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(0, 2));
        assert_eq!(g.next_fall_at_ms(), due);
    }

    #[test]
    fn test_merge_priority_compounds_three_neighbours() {
        let mut g = settled_game(5, 7);
        let center = put(&mut g, 5, 2, 2, 4);
        put(&mut g, 5, 1, 2, 1);
        put(&mut g, 5, 3, 2, 2);
        put(&mut g, 6, 2, 2, 3);

        assert_eq!(
            g.mergeable_neighbors(center).as_slice(),
            &[Position::new(5, 1), Position::new(5, 3), Position::new(6, 2)]
        );

        assert!(g.check_merge(center));
        assert_eq!(value_at(&g, 5, 2), Some(16));
        assert_eq!(g.score(), 16);
        assert_eq!(g.grid().block_count(), 1);
        assert_eq!(g.pending_removals().len(), 3);
        assert!(g.pending_removals().iter().all(|b| b.merging && b.pos == center));
    }

    #[test]
    fn test_merge_at_value_ceiling_saturates() {
        let mut g = settled_game(5, 7);
        let center = put(&mut g, 6, 2, MAX_BLOCK_VALUE, 1);
        put(&mut g, 6, 1, MAX_BLOCK_VALUE, 0);
        g.score = u64::MAX - 1;

        assert!(g.check_merge(center));
        assert_eq!(value_at(&g, 6, 2), Some(MAX_BLOCK_VALUE));
        assert!(g.blocks().all(|b| is_block_value(b.value)));
        assert_eq!(g.score(), u64::MAX);
    }

    #[test]
    fn test_recently_fallen_neighbour_is_not_merged() {
        let mut g = settled_game(5, 7);
        let resting = put(&mut g, 6, 1, 4, 3);
        put(&mut g, 6, 2, 4, 4);

        assert!(g.mergeable_neighbors(resting).is_empty());
        assert!(!g.check_merge(resting));
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_equal_last_fall_is_eligible() {
        let mut g = settled_game(5, 7);
        let a = put(&mut g, 6, 1, 8, 3);
        put(&mut g, 6, 2, 8, 3);
        assert_eq!(g.mergeable_neighbors(a).len(), 1);
    }

    #[test]
    fn test_hole_propagation_in_one_pass() {
        let mut g = settled_game(5, 7);
        put(&mut g, 2, 0, 2, 0);
        put(&mut g, 4, 0, 4, 0);

        assert_eq!(g.step_falling(), TickOutcome::Fell);
        assert_eq!(value_at(&g, 5, 0), Some(4));
        assert_eq!(value_at(&g, 3, 0), Some(2));
        assert_eq!(value_at(&g, 4, 0), None);
        assert_eq!(value_at(&g, 2, 0), None);
        assert_eq!(g.block(5, 0).unwrap().last_fall, 1);
    }

    #[test]
    fn test_stacked_column_falls_together() {
        let mut g = settled_game(3, 5);
        put(&mut g, 2, 1, 2, 0);
        put(&mut g, 3, 1, 4, 0);

        g.step_falling();
        assert_eq!(value_at(&g, 4, 1), Some(4));
        assert_eq!(value_at(&g, 3, 1), Some(2));
    }

    #[test]
    fn test_merge_tick_defers_falling() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 0, 2, 0);
        put(&mut g, 6, 1, 2, 0);
        put(&mut g, 2, 4, 8, 0);

        assert_eq!(g.step_falling(), TickOutcome::Merged);
        assert_eq!(value_at(&g, 2, 4), Some(8), "falling block must wait");
        assert_eq!(g.phase(), Phase::Merging);
        assert!(g.fast_mode());
        assert_eq!(g.next_fall_at_ms(), Some(175));
    }

    #[test]
    fn test_merge_chain_runs_on_fast_ticks() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 1, 2, 0);
        put(&mut g, 6, 2, 2, 1);
        put(&mut g, 6, 3, 4, 0);

        // (6,2) absorbs (6,1); the new 4 fell later than (6,3), so it waits.
        assert_eq!(g.step_falling(), TickOutcome::Merged);
        assert_eq!(value_at(&g, 6, 2), Some(4));
        assert_eq!(value_at(&g, 6, 3), Some(4));
        assert_eq!(g.score(), 4);

        assert_eq!(g.step_falling(), TickOutcome::Merged);
        assert_eq!(value_at(&g, 6, 2), Some(8));
        assert_eq!(value_at(&g, 6, 3), None);
        assert_eq!(g.score(), 12);

        // Stable board: fast mode ends and the next block spawns.
        assert_eq!(g.step_falling(), TickOutcome::Spawned);
        assert!(!g.fast_mode());
        assert_eq!(g.phase(), Phase::PlayerControl);
    }

    #[test]
    fn test_fast_mode_paces_falls_after_merge() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 0, 2, 0);
        put(&mut g, 6, 1, 2, 0);
        put(&mut g, 3, 4, 8, 0);

        g.step_falling();
        g.drain_events().for_each(drop);
        assert_eq!(g.step_falling(), TickOutcome::Fell);
        assert_eq!(
            g.events().last(),
            Some(&GameEvent::NextFallScheduled { delay_ms: 175 })
        );
    }

    #[test]
    fn test_adjacent_twos_merge_after_landing() {
        let config = GameConfig::with_size(5, 7).with_start_values(&[2]);
        let mut g = Game::new(config).unwrap();
        g.start_game();
        assert!(g.slide(Direction::Left));

        // First block falls to the floor, rests, then the board spawns again.
        let mut ticks = 0;
        while g.step_falling() != TickOutcome::Spawned {
            ticks += 1;
            assert!(ticks < 20);
        }
        assert_eq!(value_at(&g, 6, 1), Some(2));
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(0, 2));

        while g.block(6, 2).is_none() {
            assert_eq!(g.step_falling(), TickOutcome::Fell);
        }
        assert_eq!(g.score(), 0);

        assert_eq!(g.step_falling(), TickOutcome::Merged);
        assert_eq!(value_at(&g, 6, 2), Some(4));
        assert_eq!(value_at(&g, 6, 1), None);
        assert_eq!(g.score(), 4);
        assert!(g.last_spawned().is_none());
    }

    #[test]
    fn test_fall_delay_follows_score_after_merge() {
        let mut g = settled_game(5, 7);
        g.score = 199_996;
        put(&mut g, 6, 0, 2, 0);
        put(&mut g, 6, 1, 2, 0);

        g.step_falling();
        assert_eq!(g.score(), 200_000);
        assert_eq!(g.fall_delay_ms(), 200);
    }

    #[test]
    fn test_absorbed_controlled_block_is_released() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 0, 64, 0);
        put(&mut g, 5, 0, 16, 3);
        let active = put(&mut g, 5, 1, 16, 3);
        g.last_spawned = Some(active);
        g.phase = Phase::PlayerControl;

        assert_eq!(g.step_falling(), TickOutcome::Merged);
        assert!(g.last_spawned().is_none());
        assert_eq!(value_at(&g, 5, 0), Some(32));
        assert!(!g.slide(Direction::Right));
    }

    #[test]
    fn test_pending_removal_reported_once() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 0, 2, 0);
        put(&mut g, 6, 1, 2, 0);
        g.step_falling();

        let absorbed = g.pending_removals()[0];
        g.drain_events().for_each(drop);

        assert!(g.block_moved(absorbed.id));
        assert_eq!(g.events(), &[GameEvent::BlockRemoved(absorbed)]);
        assert!(!g.block_moved(absorbed.id));

        g.drain_events().for_each(drop);
        g.step_falling();
        assert!(!g
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::BlockRemoved(_))));
    }

    #[test]
    fn test_next_tick_flushes_pending_removals() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 0, 2, 0);
        put(&mut g, 6, 1, 2, 0);
        g.step_falling();
        let absorbed = g.pending_removals()[0];
        g.drain_events().for_each(drop);

        g.step_falling();
        assert!(g.pending_removals().is_empty());
        assert_eq!(g.events()[0], GameEvent::BlockRemoved(absorbed));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut g = settled_game(5, 7);
        put(&mut g, 6, 0, 2, 0);
        put(&mut g, 6, 1, 2, 0);
        put(&mut g, 4, 4, 32, 0);
        g.step_falling();
        g.drain_events().for_each(drop);

        g.reset();
        assert_eq!(g.phase(), Phase::Idle);
        assert_eq!(g.grid().block_count(), 0);
        assert_eq!(g.score(), 0);
        assert_eq!(g.fall_count(), 0);
        assert!(!g.fast_mode());
        assert_eq!(g.fall_delay_ms(), 600);
        assert_eq!(g.next_fall_at_ms(), None);

        let removed = g
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::BlockRemoved(_)))
            .count();
        assert_eq!(removed, 3, "one absorbed block plus two live blocks");
        assert!(g.events().contains(&GameEvent::ScoreChanged { score: 0 }));
    }

    #[test]
    fn test_update_runs_tick_when_due() {
        let mut g = game(5, 7);
        g.start_game();

        assert_eq!(g.update(599), None);
        assert_eq!(g.update(1), Some(TickOutcome::Fell));
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(1, 2));
        assert_eq!(g.next_fall_at_ms(), Some(1200));
    }

    #[test]
    fn test_update_runs_at_most_one_tick() {
        let mut g = game(5, 7);
        g.start_game();

        assert_eq!(g.update(5000), Some(TickOutcome::Fell));
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(1, 2));
    }

    #[test]
    fn test_update_ignored_when_idle() {
        let mut g = game(5, 7);
        assert_eq!(g.update(1000), None);
        assert_eq!(g.clock_ms(), 0);
    }

    #[test]
    fn test_pause_freezes_clock_and_intents() {
        let mut g = game(5, 7);
        g.start_game();

        assert!(g.toggle_pause());
        assert_eq!(g.update(10_000), None);
        assert_eq!(g.clock_ms(), 0);
        assert!(!g.slide(Direction::Left));
        assert!(!g.hard_drop());

        assert!(g.toggle_pause());
        assert!(g.slide(Direction::Left));
    }

    #[test]
    fn test_pause_not_available_when_idle() {
        let mut g = game(5, 7);
        assert!(!g.toggle_pause());
        assert!(!g.paused());
    }

    #[test]
    fn test_apply_action_start_and_restart() {
        let mut g = game(5, 7);
        assert!(g.apply_action(GameAction::Start));
        assert_eq!(g.phase(), Phase::PlayerControl);
        assert!(!g.apply_action(GameAction::Start), "already running");

        g.apply_action(GameAction::Drop);
        assert!(g.apply_action(GameAction::Restart));
        assert_eq!(g.fall_count(), 0);
        assert_eq!(g.last_spawned().unwrap().pos, Position::new(0, 2));
    }

    #[test]
    fn test_block_out_of_bounds_is_empty() {
        let mut g = game(5, 7);
        g.start_game();
        assert!(g.block(0, 2).is_some());
        assert!(g.block(-1, 2).is_none());
        assert!(g.block(0, 5).is_none());
        assert!(g.block(7, 0).is_none());
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut g = game(5, 7);
        g.start_game();
        let snap = g.snapshot();

        assert_eq!((snap.width, snap.height), (5, 7));
        assert_eq!(snap.cells.len(), 35);
        assert_eq!(snap.block_count(), 1);
        assert_eq!(snap.active, Some(Position::new(0, 2)));
        assert_eq!(snap.cell(0, 2).map(|c| c.value), g.last_spawned().map(|b| b.value));
        assert!(snap.playable());
    }
}
