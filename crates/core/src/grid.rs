//! Grid module - the fixed-size well that holds live blocks
//!
//! Cells are stored in a flat, row-major vector sized once at construction.
//! Coordinates are `(row, col)` with row 0 at the top; queries take signed
//! coordinates so neighbour lookups never have to pre-check bounds.
//! The spawn cell is `(0, width / 2)`.

use crate::types::{Block, Position};

/// The playfield: `width` columns by `height` rows of optional blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (row * width + col)
    cells: Vec<Option<Block>>,
}

impl Grid {
    /// Create an empty grid. Dimensions are fixed for the grid's lifetime.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    #[inline(always)]
    fn index(&self, row: i8, col: i8) -> Option<usize> {
        if row < 0 || col < 0 || row as u8 >= self.height || col as u8 >= self.width {
            return None;
        }
        Some(row as usize * self.width as usize + col as usize)
    }

    #[inline(always)]
    fn pos_index(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.height || pos.col >= self.width {
            return None;
        }
        Some(pos.row as usize * self.width as usize + pos.col as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Block at `(row, col)`. Out-of-bounds coordinates read as empty.
    pub fn get(&self, row: i8, col: i8) -> Option<&Block> {
        self.index(row, col).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn at(&self, pos: Position) -> Option<&Block> {
        self.pos_index(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn at_mut(&mut self, pos: Position) -> Option<&mut Block> {
        match self.pos_index(pos) {
            Some(idx) => self.cells[idx].as_mut(),
            None => None,
        }
    }

    /// In bounds and holding a block
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.at(pos).is_some()
    }

    /// In bounds and empty
    pub fn is_free(&self, row: i8, col: i8) -> bool {
        matches!(self.index(row, col), Some(idx) if self.cells[idx].is_none())
    }

    /// Store `block` at its own position.
    ///
    /// Returns false (and stores nothing) if the position is out of bounds
    /// or already taken.
    pub fn insert(&mut self, block: Block) -> bool {
        match self.pos_index(block.pos) {
            Some(idx) if self.cells[idx].is_none() => {
                self.cells[idx] = Some(block);
                true
            }
            _ => false,
        }
    }

    /// Remove and return the block at `pos`
    pub fn take(&mut self, pos: Position) -> Option<Block> {
        let idx = self.pos_index(pos)?;
        self.cells[idx].take()
    }

    /// Cell where new blocks appear: top row, middle column (rounded down).
    pub fn spawn_position(&self) -> Position {
        Position::new(0, self.width / 2)
    }

    /// A block can fall when it is above the floor and the cell below is empty.
    pub fn can_fall(&self, pos: Position) -> bool {
        if pos.row + 1 >= self.height {
            return false;
        }
        self.is_free(pos.row as i8 + 1, pos.col as i8)
    }

    /// Lowest free row reachable by falling straight down from `pos`.
    ///
    /// Scans from `pos.row + 1` until an occupied cell or the floor. Returns
    /// `None` when the cell directly below is already blocked.
    pub fn landing_row(&self, pos: Position) -> Option<u8> {
        let mut last_free = None;
        for row in pos.row + 1..self.height {
            if !self.is_free(row as i8, pos.col as i8) {
                break;
            }
            last_free = Some(row);
        }
        last_free
    }

    /// Iterate live blocks in storage (row-major) order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.cells.iter().filter_map(|cell| cell.as_ref())
    }

    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// Empty every cell, yielding the blocks that were removed.
    pub fn drain(&mut self) -> impl Iterator<Item = Block> + '_ {
        self.cells.iter_mut().filter_map(|cell| cell.take())
    }

    /// Every stored block sits in the cell its position names.
    pub fn is_consistent(&self) -> bool {
        self.cells.iter().enumerate().all(|(idx, cell)| match cell {
            Some(block) => self.pos_index(block.pos) == Some(idx) && !block.merging,
            None => true,
        })
    }
}

/// Cell visiting order for the tick passes: bottom row first, left to right.
///
/// Moving a block into a row that has already been visited means a column of
/// blocks with a hole under it shifts down together in a single pass.
pub fn bottom_up(width: u8, height: u8) -> impl Iterator<Item = Position> {
    (0..height)
        .rev()
        .flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
}
