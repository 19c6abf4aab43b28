//! Terminal presentation adapter.
//!
//! [`TermFrontend`] consumes the game's event queue and keeps the visual
//! state the core does not: bounce flashes after a merge and the ghost of
//! each absorbed block while its merge animation plays. When a ghost's
//! animation ends the frontend reports it back with [`Game::block_moved`].

use std::collections::HashMap;

use log::debug;

use crate::core::{EventSink, Game};
use crate::term::{Ghost, ViewEffects};
use crate::types::{Block, BlockId, Position};

/// How long a merged block flashes
pub const BOUNCE_MS: u64 = 150;
/// How long an absorbed block stays visible before its removal is reported
pub const MERGE_ANIM_MS: u64 = 120;

#[derive(Debug, Default)]
pub struct TermFrontend {
    clock_ms: u64,
    /// Last cell of every live block
    cells: HashMap<BlockId, Position>,
    flashes: Vec<(BlockId, u64)>,
    ghosts: Vec<(Ghost, u64)>,
    final_score: Option<u64>,
}

impl TermFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance animation time and report finished merge animations.
    pub fn advance(&mut self, elapsed_ms: u32, game: &mut Game) {
        self.clock_ms += elapsed_ms as u64;
        let now = self.clock_ms;

        self.flashes.retain(|&(_, until)| until > now);

        let mut i = 0;
        while i < self.ghosts.len() {
            let (ghost, until) = self.ghosts[i];
            if until <= now {
                self.ghosts.swap_remove(i);
                game.block_moved(ghost.id);
            } else {
                i += 1;
            }
        }
    }

    /// Drain the game's queued events into this frontend.
    pub fn sync(&mut self, game: &mut Game) {
        game.drain_events_into(self);
    }

    pub fn effects_into(&self, out: &mut ViewEffects) {
        out.clear();
        out.flashing.extend(self.flashes.iter().map(|&(id, _)| id));
        out.ghosts.extend(self.ghosts.iter().map(|&(ghost, _)| ghost));
    }

    pub fn effects(&self) -> ViewEffects {
        let mut out = ViewEffects::default();
        self.effects_into(&mut out);
        out
    }

    /// Score of the last finished game, until a new block appears
    pub fn final_score(&self) -> Option<u64> {
        self.final_score
    }

    pub fn tracked_blocks(&self) -> usize {
        self.cells.len()
    }

    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }
}

impl EventSink for TermFrontend {
    fn make_block(&mut self, block: &Block) {
        self.final_score = None;
        self.cells.insert(block.id, block.pos);
    }

    fn place_block(&mut self, block: &Block, merge: bool) {
        if !merge {
            self.cells.insert(block.id, block.pos);
            return;
        }
        let from = self.cells.remove(&block.id).unwrap_or(block.pos);
        let ghost = Ghost {
            id: block.id,
            value: block.value,
            pos: from,
        };
        self.ghosts.push((ghost, self.clock_ms + MERGE_ANIM_MS));
    }

    fn remove_block(&mut self, block: &Block) {
        self.cells.remove(&block.id);
        self.ghosts.retain(|(ghost, _)| ghost.id != block.id);
    }

    fn bounce(&mut self, block: &Block) {
        self.flashes.retain(|&(id, _)| id != block.id);
        self.flashes.push((block.id, self.clock_ms + BOUNCE_MS));
    }

    fn game_over(&mut self, score: u64) {
        debug!("frontend: game over at {}", score);
        self.final_score = Some(score);
    }
}
