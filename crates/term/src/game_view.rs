//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). Transient effects the core does not track
//! (bounce flashes, merge ghosts) come in through [`ViewEffects`].

use crate::core::scoring::bpm_for_score;
use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{BlockId, Phase, Position, MAX_STYLED_VALUE};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// An absorbed block still shown at its last own cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    pub id: BlockId,
    pub value: u64,
    pub pos: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewEffects {
    /// Blocks drawn highlighted this frame
    pub flashing: Vec<BlockId>,
    pub ghosts: Vec<Ghost>,
}

impl ViewEffects {
    pub fn clear(&mut self) {
        self.flashing.clear();
        self.ghosts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.flashing.is_empty() && self.ghosts.is_empty()
    }
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_W: u16 = 14;

/// Background and label color for each styled value, 2 through 2048.
const VALUE_COLORS: [(Rgb, Rgb); 11] = [
    (Rgb::new(238, 228, 218), Rgb::new(60, 58, 50)),
    (Rgb::new(237, 224, 200), Rgb::new(60, 58, 50)),
    (Rgb::new(242, 177, 121), Rgb::new(249, 246, 242)),
    (Rgb::new(245, 149, 99), Rgb::new(249, 246, 242)),
    (Rgb::new(246, 124, 95), Rgb::new(249, 246, 242)),
    (Rgb::new(246, 94, 59), Rgb::new(249, 246, 242)),
    (Rgb::new(237, 207, 114), Rgb::new(249, 246, 242)),
    (Rgb::new(237, 204, 97), Rgb::new(249, 246, 242)),
    (Rgb::new(237, 200, 80), Rgb::new(249, 246, 242)),
    (Rgb::new(237, 197, 63), Rgb::new(249, 246, 242)),
    (Rgb::new(237, 194, 46), Rgb::new(249, 246, 242)),
];

const OVER_COLORS: (Rgb, Rgb) = (Rgb::new(60, 58, 50), Rgb::new(249, 246, 242));

/// Style of a block carrying `value`; everything above 2048 shares one style.
pub fn value_style(value: u64) -> CellStyle {
    let (bg, fg) = if value > MAX_STYLED_VALUE || value < 2 {
        OVER_COLORS
    } else {
        VALUE_COLORS[(value.trailing_zeros() as usize).saturating_sub(1)]
    };
    CellStyle::new(fg, bg).bold()
}

/// A lightweight terminal renderer for the merge grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 6x3 keeps cells roughly square and fits four digits with margins.
        Self {
            cell_w: 6,
            cell_h: 3,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// One row per cell, for short terminals.
    pub fn compact() -> Self {
        Self::new(5, 1)
    }

    /// The default view if a `width x height` grid fits `viewport`, else compact.
    pub fn fitting(width: u8, height: u8, viewport: Viewport) -> Self {
        let view = Self::default();
        let (w, h) = view.frame_size(width, height);
        if w + 2 + PANEL_W <= viewport.width && h <= viewport.height {
            view
        } else {
            Self::compact()
        }
    }

    /// Board size including its border
    pub fn frame_size(&self, width: u8, height: u8) -> (u16, u16) {
        (
            width as u16 * self.cell_w + 2,
            height as u16 * self.cell_h + 2,
        )
    }

    /// Render into an existing framebuffer, resizing it to `viewport`.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        effects: &ViewEffects,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (frame_w, frame_h) = self.frame_size(snap.width, snap.height);
        let with_panel = frame_w + 2 + PANEL_W <= viewport.width;
        let total_w = if with_panel {
            frame_w + 2 + PANEL_W
        } else {
            frame_w
        };
        let start_x = viewport.width.saturating_sub(total_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(
            start_x + 1,
            start_y + 1,
            frame_w - 2,
            frame_h - 2,
            ' ',
            CellStyle::new(BOARD_BG, BOARD_BG),
        );
        draw_border(fb, start_x, start_y, frame_w, frame_h, border);

        for row in 0..snap.height {
            for col in 0..snap.width {
                if snap.cell(row, col).is_none() {
                    self.draw_empty_cell(fb, start_x, start_y, row, col);
                }
            }
        }

        for ghost in &effects.ghosts {
            if snap.cell(ghost.pos.row, ghost.pos.col).is_none() {
                let style = value_style(ghost.value).dim();
                self.fill_cell(fb, start_x, start_y, ghost.pos, '░', style);
            }
        }

        for row in 0..snap.height {
            for col in 0..snap.width {
                let Some(cell) = snap.cell(row, col) else {
                    continue;
                };
                let pos = Position::new(row, col);
                let mut style = value_style(cell.value);
                if effects.flashing.contains(&cell.id) {
                    style.bg = style.bg.lighten(40);
                }
                self.fill_cell(fb, start_x, start_y, pos, ' ', style);
                self.draw_value_label(fb, start_x, start_y, pos, cell.value, style);
                if snap.active == Some(pos) && self.cell_h >= 3 {
                    let (px, py) = self.cell_origin(start_x, start_y, pos);
                    fb.put_centered(px, py, self.cell_w, "▼", style);
                }
            }
        }

        if with_panel {
            self.draw_side_panel(fb, snap, start_x + frame_w + 2, start_y, viewport);
        }

        match (snap.phase, snap.paused) {
            (Phase::Idle, _) => {
                draw_overlay(fb, start_x, start_y, frame_w, frame_h, &["PRESS ENTER", "TO START"])
            }
            (Phase::GameOver, _) => draw_overlay(
                fb,
                start_x,
                start_y,
                frame_w,
                frame_h,
                &["GAME OVER", "R TO RESTART"],
            ),
            (_, true) => draw_overlay(fb, start_x, start_y, frame_w, frame_h, &["PAUSED"]),
            _ => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        snap: &GameSnapshot,
        effects: &ViewEffects,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, effects, viewport, &mut fb);
        fb
    }

    fn cell_origin(&self, start_x: u16, start_y: u16, pos: Position) -> (u16, u16) {
        (
            start_x + 1 + pos.col as u16 * self.cell_w,
            start_y + 1 + pos.row as u16 * self.cell_h,
        )
    }

    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        pos: Position,
        ch: char,
        style: CellStyle,
    ) {
        let (px, py) = self.cell_origin(start_x, start_y, pos);
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, start_x: u16, start_y: u16, row: u8, col: u8) {
        let style = CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim();
        let (px, py) = self.cell_origin(start_x, start_y, Position::new(row, col));
        fb.put_centered(px, py + self.cell_h / 2, self.cell_w, "·", style);
    }

    /// Value centered in the cell; `2^n` when the digits do not fit.
    fn draw_value_label(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        pos: Position,
        value: u64,
        style: CellStyle,
    ) {
        let (px, py) = self.cell_origin(start_x, start_y, pos);
        let y = py + self.cell_h / 2;

        let mut digits = [0u8; 20];
        let len = crate::fb::format_u64(value, &mut digits) as u16;
        if len <= self.cell_w {
            fb.put_u64(px + (self.cell_w - len) / 2, y, value, style);
        } else {
            fb.put_str(px, y, "2^", style);
            fb.put_u64(px + 2, y, value.trailing_zeros() as u64, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        panel_x: u16,
        start_y: u16,
        viewport: Viewport,
    ) {
        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u64(panel_x, y + 1, snap.score, value);
        y += 3;

        fb.put_str(panel_x, y, "NEXT", label);
        if snap.next_value > 0 {
            let swatch = value_style(snap.next_value);
            fb.fill_rect(panel_x, y + 1, 6, 1, ' ', swatch);
            let mut digits = [0u8; 20];
            let len = crate::fb::format_u64(snap.next_value, &mut digits) as u16;
            fb.put_u64(panel_x + 6u16.saturating_sub(len) / 2, y + 1, snap.next_value, swatch);
        }
        y += 3;

        fb.put_str(panel_x, y, "BPM", label);
        let len = fb.put_u64(panel_x, y + 1, bpm_for_score(snap.score).round() as u64, value);
        if snap.fast_mode {
            fb.put_str(panel_x + len + 1, y + 1, "FAST", label);
        }
        y += 3;

        for help in ["←→ slide", "↓ drop", "P pause", "R restart", "Q quit"] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, help, dim);
            y += 1;
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, lines: &[&str]) {
    let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
    let top = y + h.saturating_sub(lines.len() as u16) / 2;
    for (i, line) in lines.iter().enumerate() {
        let row = top + i as u16;
        let len = line.chars().count() as u16;
        let lx = x + w.saturating_sub(len + 2) / 2;
        fb.fill_rect(lx, row, len + 2, 1, ' ', style);
        fb.put_str(lx + 1, row, line, style);
    }
}
