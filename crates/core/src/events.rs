//! Presentation callbacks.
//!
//! The game queues a [`GameEvent`] for every visible state change. Adapters
//! either consume the queue directly or implement [`EventSink`] and let
//! [`dispatch`] route each event to the matching callback. All callbacks
//! default to no-ops so an adapter only implements what it renders.

use crate::types::{Block, GameEvent};

pub trait EventSink {
    /// A new block appeared
    fn make_block(&mut self, _block: &Block) {}

    /// A block moved to `block.pos`; with `merge` set it was absorbed there
    fn place_block(&mut self, _block: &Block, _merge: bool) {}

    /// A block is gone and its visual can be dropped
    fn remove_block(&mut self, _block: &Block) {}

    fn update_value(&mut self, _block: &Block) {}

    fn update_score(&mut self, _score: u64) {}

    fn update_next_block(&mut self, _value: u64) {}

    fn bounce(&mut self, _block: &Block) {}

    /// The next automatic fall tick is due `delay_ms` from now
    fn set_next_fall(&mut self, _delay_ms: u32) {}

    fn game_over(&mut self, _score: u64) {}
}

/// Route one event to its callback
pub fn dispatch(event: &GameEvent, sink: &mut impl EventSink) {
    match event {
        GameEvent::BlockCreated(block) => sink.make_block(block),
        GameEvent::BlockPlaced { block, merge } => sink.place_block(block, *merge),
        GameEvent::BlockRemoved(block) => sink.remove_block(block),
        GameEvent::ValueChanged(block) => sink.update_value(block),
        GameEvent::ScoreChanged { score } => sink.update_score(*score),
        GameEvent::NextValueChanged { value } => sink.update_next_block(*value),
        GameEvent::Bounce(block) => sink.bounce(block),
        GameEvent::NextFallScheduled { delay_ms } => sink.set_next_fall(*delay_ms),
        GameEvent::GameOver { score } => sink.game_over(*score),
    }
}

/// Recording sink, handy for tests and replays
impl EventSink for Vec<GameEvent> {
    fn make_block(&mut self, block: &Block) {
        self.push(GameEvent::BlockCreated(*block));
    }

    fn place_block(&mut self, block: &Block, merge: bool) {
        self.push(GameEvent::BlockPlaced {
            block: *block,
            merge,
        });
    }

    fn remove_block(&mut self, block: &Block) {
        self.push(GameEvent::BlockRemoved(*block));
    }

    fn update_value(&mut self, block: &Block) {
        self.push(GameEvent::ValueChanged(*block));
    }

    fn update_score(&mut self, score: u64) {
        self.push(GameEvent::ScoreChanged { score });
    }

    fn update_next_block(&mut self, value: u64) {
        self.push(GameEvent::NextValueChanged { value });
    }

    fn bounce(&mut self, block: &Block) {
        self.push(GameEvent::Bounce(*block));
    }

    fn set_next_fall(&mut self, delay_ms: u32) {
        self.push(GameEvent::NextFallScheduled { delay_ms });
    }

    fn game_over(&mut self, score: u64) {
        self.push(GameEvent::GameOver { score });
    }
}
