//! Scoring module - merge scoring and score-driven fall speed
//!
//! A merge scores the final value of the surviving block. The fall tempo rises
//! linearly with score, from 100 BPM at 0 points to 300 BPM at 200000 points,
//! and keeps rising past that.

use crate::types::{BASE_BPM, BPM_RANGE, BPM_SCORE_SPAN, MAX_BLOCK_VALUE};

/// Fall tempo in rows per minute for a given score
pub fn bpm_for_score(score: u64) -> f64 {
    BASE_BPM + BPM_RANGE * score as f64 / BPM_SCORE_SPAN
}

/// Milliseconds between automatic fall ticks, rounded to the nearest ms.
///
/// ```
/// use merge_fall_core::scoring::fall_delay_ms;
///
/// assert_eq!(fall_delay_ms(0), 600);
/// assert_eq!(fall_delay_ms(200_000), 200);
/// ```
pub fn fall_delay_ms(score: u64) -> u32 {
    (60.0 / bpm_for_score(score) * 1000.0).round() as u32
}

/// Value of a block after absorbing `merged` equal neighbours.
///
/// Each absorbed neighbour doubles the value once, so a block with three
/// equal neighbours ends at eight times its starting value. The result
/// saturates at [`MAX_BLOCK_VALUE`] so it stays a power of two.
pub fn merged_value(value: u64, merged: usize) -> u64 {
    if merged < value.leading_zeros() as usize {
        value << merged
    } else {
        MAX_BLOCK_VALUE
    }
}
