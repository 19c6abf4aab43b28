use crate::types::{BlockId, Phase, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSnapshot {
    pub id: BlockId,
    pub value: u64,
}

/// Read-only view of a game, reusable across frames via `snapshot_into`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major cells, `width * height` long
    pub cells: Vec<Option<CellSnapshot>>,
    pub active: Option<Position>,
    pub phase: Phase,
    pub paused: bool,
    pub score: u64,
    pub next_value: u64,
    pub fall_count: u32,
    pub fall_delay_ms: u32,
    pub fast_mode: bool,
}

impl GameSnapshot {
    pub fn cell(&self, row: u8, col: u8) -> Option<CellSnapshot> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells[row as usize * self.width as usize + col as usize]
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.width = 0;
        self.height = 0;
        self.active = None;
        self.phase = Phase::Idle;
        self.paused = false;
        self.score = 0;
        self.next_value = 0;
        self.fall_count = 0;
        self.fall_delay_ms = 0;
        self.fast_mode = false;
    }

    pub fn playable(&self) -> bool {
        self.phase.is_running() && !self.paused
    }

    /// Number of occupied cells
    pub fn block_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
