//! Pointer drag gestures mapped to slide and drop intents.
//!
//! A gesture starts on press. While dragging, whichever axis moved further
//! decides the intent:
//! - downward past the threshold: drop, and the gesture ends
//! - sideways past the threshold: slide, and the anchor moves to the current
//!   point so a long drag keeps sliding
//!
//! Upward drags do nothing.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::types::{Direction, GameAction};

/// Drag distance, in pointer units, needed to trigger an intent
pub const DEFAULT_SWIPE_THRESHOLD: i32 = 100;

#[derive(Debug, Clone)]
pub struct SwipeTracker {
    anchor: Option<(i32, i32)>,
    threshold: i32,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: i32) -> Self {
        Self {
            anchor: None,
            threshold,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn start(&mut self, x: i32, y: i32) {
        self.anchor = Some((x, y));
    }

    pub fn end(&mut self) {
        self.anchor = None;
    }

    /// Feed a pointer position; returns the intent it triggers, if any.
    pub fn move_to(&mut self, x: i32, y: i32) -> Option<GameAction> {
        let (ax, ay) = self.anchor?;
        let dx = x - ax;
        let dy = y - ay;

        if dy.abs() > dx.abs() {
            if dy > self.threshold {
                self.end();
                return Some(GameAction::Drop);
            }
            return None;
        }

        let direction = if dx > self.threshold {
            Direction::Right
        } else if dx < -self.threshold {
            Direction::Left
        } else {
            return None;
        };
        self.start(x, y);
        Some(GameAction::Slide(direction))
    }

    /// Drive the tracker from terminal mouse events (left button only).
    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> Option<GameAction> {
        let (x, y) = (event.column as i32, event.row as i32);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start(x, y);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => self.move_to(x, y),
            MouseEventKind::Up(MouseButton::Left) => {
                self.end();
                None
            }
            _ => None,
        }
    }
}
