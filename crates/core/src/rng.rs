//! RNG module - deterministic choice of spawn values
//!
//! Spawn values are drawn uniformly from the configured start set. The
//! generator is a small LCG so a seed fully determines a game, which keeps
//! tests and replays reproducible.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in `[0, max)`.
    ///
    /// Uses multiply-shift reduction so the result depends on the high bits;
    /// the low bits of a power-of-two LCG have very short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Pick one element uniformly, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_range(items.len() as u32) as usize)
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Source of next-spawn values
#[derive(Debug, Clone)]
pub struct ValueQueue {
    values: Vec<u64>,
    rng: SimpleRng,
}

impl ValueQueue {
    /// `values` must be non-empty; `GameConfig::validate` guarantees this for
    /// queues built by the game.
    pub fn new(seed: u32, values: &[u64]) -> Self {
        Self {
            values: values.to_vec(),
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw the next spawn value
    pub fn draw(&mut self) -> u64 {
        self.rng.pick(&self.values).copied().unwrap_or(2)
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Current RNG state (restarting from it continues the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::START_VALUES;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_not_degenerate() {
        let mut rng = SimpleRng::new(0);
        let a = rng.next_u32();
        let b = rng.next_u32();
        assert_ne!(a, b);
    }

    #[test]
    fn test_next_range_stays_in_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(6) < 6);
        }
    }

    #[test]
    fn test_pick_empty_slice() {
        let mut rng = SimpleRng::new(7);
        let empty: [u64; 0] = [];
        assert_eq!(rng.pick(&empty), None);
    }

    #[test]
    fn test_value_queue_covers_start_set() {
        let mut queue = ValueQueue::new(1, &START_VALUES);
        let mut seen = [false; 6];
        for _ in 0..600 {
            let value = queue.draw();
            let idx = START_VALUES
                .iter()
                .position(|&v| v == value)
                .expect("drawn value outside the start set");
            seen[idx] = true;
        }
        assert!(seen.iter().all(|&s| s), "every start value should appear: {:?}", seen);
    }

    #[test]
    fn test_value_queue_parity_does_not_alternate() {
        // A plain `% len` on this LCG would alternate between even and odd
        // indices; make sure two consecutive draws can share parity.
        let mut queue = ValueQueue::new(99, &START_VALUES);
        let idx = |v: u64| START_VALUES.iter().position(|&s| s == v).unwrap_or(0);
        let draws: Vec<usize> = (0..64).map(|_| idx(queue.draw())).collect();
        assert!(draws.windows(2).any(|w| w[0] % 2 == w[1] % 2));
    }

    #[test]
    fn test_single_value_queue() {
        let mut queue = ValueQueue::new(5, &[8]);
        for _ in 0..10 {
            assert_eq!(queue.draw(), 8);
        }
    }
}
