//! Injectable randomness.
//!
//! Every random choice the engine makes (effect picks, summoned unit type,
//! battlefield obstacles) goes through `RandomSource`, so tests can script
//! the exact sequence of picks.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random indices.
pub trait RandomSource: Send {
    /// Returns an index in `0..bound`. `bound` is always at least 1.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// Picks one element uniformly, or `None` from an empty slice.
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.next_index(items.len()))
}

/// Seeded generator used by live sessions.
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// Creates a generator with a fixed seed; 0 draws from entropy.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        SeededRandom { rng }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound.max(1))
    }
}

/// Replays a fixed list of indices; returns 0 once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    values: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(values: &[usize]) -> Self {
        ScriptedRandom {
            values: values.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        self.values.pop_front().unwrap_or(0) % bound.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_replays_then_zero() {
        let mut r = ScriptedRandom::new(&[3, 1]);
        assert_eq!(r.next_index(5), 3);
        assert_eq!(r.next_index(5), 1);
        assert_eq!(r.next_index(5), 0);
    }

    #[test]
    fn scripted_wraps_to_bound() {
        let mut r = ScriptedRandom::new(&[7]);
        assert_eq!(r.next_index(5), 2);
    }

    #[test]
    fn choose_handles_empty() {
        let mut r = ScriptedRandom::new(&[2]);
        let empty: [u8; 0] = [];
        assert_eq!(choose(&mut r, &empty), None);
        assert_eq!(choose(&mut r, &["a", "b", "c"]), Some(&"c"));
    }

    #[test]
    fn seeded_is_deterministic_and_in_range() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..100 {
            let x = a.next_index(7);
            assert!(x < 7);
            assert_eq!(x, b.next_index(7));
        }
    }
}
