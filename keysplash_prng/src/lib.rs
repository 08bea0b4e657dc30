// Deterministic, portable pseudo-random number generator.
//
// A 32-bit linear congruential generator:
//   state = (state * 1664525 + 1013904223) mod 2^32
//   output = state / 2^32
// Every derived operation (ranges, picks, shuffles, weighted picks) is built
// from repeated calls to `next_f64`, so the order of calls is itself part of
// the observable contract. Two sessions that make the same calls in the same
// order see the same values.
//
// This crate is the single PRNG used across Keysplash: `keysplash_keymap`
// (behavior table), `keysplash_music` (notes, patterns, layer picks) and
// `keysplash_canvas` (placement, colors, animation). Each component owns its
// own `SessionRng`, seeded from the session seed.
//
// **Critical constraint: determinism.** Nothing in this module may consult
// wall-clock time, OS entropy, or any unseeded source. The recurrence runs in
// wrapping `u32` arithmetic; the only floating-point step is the final
// division by 2^32, which is exact for every `u32`.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;
const MODULUS: f64 = 4_294_967_296.0; // 2^32

/// Linear congruential PRNG: the session's sole source of randomness.
///
/// One instance per component per session. Never shared mutably across
/// sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRng {
    state: u32,
}

impl SessionRng {
    /// Create a new generator whose register starts at `seed`.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current register value. Exposed for snapshots and debugging.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance the recurrence and return the new register value.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        self.state
    }

    /// Generate a uniform `f64` in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / MODULUS
    }

    /// Generate a uniform real in `[low, high)`.
    ///
    /// `low == high` is allowed and returns `low` (one draw is still consumed).
    /// Panics if `low > high`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        assert!(low <= high, "range_f64: low must be <= high");
        low + self.next_f64() * (high - low)
    }

    /// `f32` convenience over [`SessionRng::range_f64`].
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        self.range_f64(low as f64, high as f64) as f32
    }

    /// Generate a uniform integer in `[low, high]` (inclusive on both ends).
    ///
    /// Computed as `low + floor(next * (high - low + 1))`.
    /// Panics if `low > high`.
    pub fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        assert!(low <= high, "int_inclusive: low must be <= high");
        let span = (high - low + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i64;
        // 1 - 2^-32 times a very large span can round up to the span itself.
        low + offset.min(high - low)
    }

    /// Uniform `usize` in `[low, high]`, delegating to `int_inclusive`.
    pub fn usize_inclusive(&mut self, low: usize, high: usize) -> usize {
        self.int_inclusive(low as i64, high as i64) as usize
    }

    /// Return `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one element uniformly. Returns `None` (without drawing) for an
    /// empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.usize_inclusive(0, items.len() - 1);
        items.get(idx)
    }

    /// In-place Fisher–Yates shuffle, walking from the last index down to 1.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.usize_inclusive(0, i);
            items.swap(i, j);
        }
    }

    /// Pick an item with probability proportional to its weight.
    ///
    /// Draws `r = next * total_weight` once, then subtracts weights in order
    /// until `r` goes non-positive. If rounding consumes the whole range the
    /// last item is returned. Weights need not sum to 1. Items beyond the
    /// shorter of the two slices are ignored. Returns `None` without drawing
    /// when there is nothing to pick from.
    pub fn weighted_pick<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
        let len = items.len().min(weights.len());
        if len == 0 {
            return None;
        }
        let total: f64 = weights[..len].iter().sum();
        let mut r = self.next_f64() * total;
        for (item, &weight) in items[..len].iter().zip(weights) {
            r -= weight;
            if r <= 0.0 {
                return Some(item);
            }
        }
        items.get(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_same_seed_same_output() {
        let mut a = SessionRng::new(42);
        let mut b = SessionRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = SessionRng::new(42);
        let mut b = SessionRng::new(43);
        assert_ne!(a.next_u32(), b.next_u32());
    }

    /// Reference values computed by hand from the recurrence. If this test
    /// ever breaks, replay compatibility has been violated.
    #[test]
    fn known_sequence_from_seed_42() {
        let mut rng = SessionRng::new(42);
        let vals: Vec<u32> = (0..5).map(|_| rng.next_u32()).collect();
        assert_eq!(
            vals,
            vec![1_083_814_273, 378_494_188, 2_479_403_867, 955_863_294, 1_613_448_261]
        );
    }

    #[test]
    fn seed_zero_first_output_is_increment() {
        let mut rng = SessionRng::new(0);
        let v = rng.next_f64();
        assert_eq!(rng.state(), 1_013_904_223);
        assert!((v - 0.236_067_972_844_466_57).abs() < 1e-12);
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = SessionRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_f64_within_bounds() {
        let mut rng = SessionRng::new(777);
        for _ in 0..10_000 {
            let v = rng.range_f64(1.5, 3.5);
            assert!((1.5..3.5).contains(&v), "range_f64 out of range: {v}");
        }
    }

    #[test]
    fn int_inclusive_reaches_both_ends() {
        let mut rng = SessionRng::new(666);
        let mut seen = [false; 6];
        for _ in 0..10_000 {
            let v = rng.int_inclusive(5, 10);
            assert!((5..=10).contains(&v), "int_inclusive out of range: {v}");
            seen[(v - 5) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every value in [5, 10] should appear");
    }

    #[test]
    fn int_inclusive_single_value() {
        let mut rng = SessionRng::new(1);
        for _ in 0..100 {
            assert_eq!(rng.int_inclusive(3, 3), 3);
        }
    }

    #[test]
    fn pick_empty_is_none_and_does_not_draw() {
        let mut rng = SessionRng::new(9);
        let before = rng.state();
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
        assert_eq!(rng.state(), before);
    }

    #[test]
    fn pick_returns_member() {
        let mut rng = SessionRng::new(9);
        let items = ['a', 'b', 'c'];
        for _ in 0..100 {
            assert!(items.contains(rng.pick(&items).unwrap()));
        }
    }

    #[test]
    fn shuffle_is_a_permutation_and_deterministic() {
        let mut a = SessionRng::new(5);
        let mut b = SessionRng::new(5);
        let mut xs: Vec<u32> = (0..20).collect();
        let mut ys: Vec<u32> = (0..20).collect();
        a.shuffle(&mut xs);
        b.shuffle(&mut ys);
        assert_eq!(xs, ys);
        let mut sorted = xs.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        assert_ne!(xs, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_draws_len_minus_one_times() {
        let mut a = SessionRng::new(5);
        let mut b = SessionRng::new(5);
        let mut xs = [1, 2, 3, 4];
        a.shuffle(&mut xs);
        for _ in 0..3 {
            b.next_u32();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn weighted_pick_distribution() {
        let mut rng = SessionRng::new(2024);
        let items = ["a", "b", "c", "d"];
        let weights = [0.1, 0.2, 0.3, 0.35]; // sums to 0.95
        let total: f64 = weights.iter().sum();
        let n = 20_000;
        let mut counts = [0usize; 4];
        for _ in 0..n {
            let picked = rng.weighted_pick(&items, &weights).unwrap();
            let idx = items.iter().position(|i| i == picked).unwrap();
            counts[idx] += 1;
        }
        for (i, &count) in counts.iter().enumerate() {
            let observed = count as f64 / n as f64;
            let expected = weights[i] / total;
            assert!(
                (observed - expected).abs() < 0.02,
                "item {i}: observed {observed:.3}, expected {expected:.3}"
            );
        }
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = SessionRng::new(77);
        let items = [1, 2, 3];
        let weights = [0.0, 1.0, 0.0];
        for _ in 0..1000 {
            assert_eq!(*rng.weighted_pick(&items, &weights).unwrap(), 2);
        }
    }

    #[test]
    fn weighted_pick_empty_is_none() {
        let mut rng = SessionRng::new(77);
        let items: [u8; 0] = [];
        assert!(rng.weighted_pick(&items, &[]).is_none());
    }

    #[test]
    fn chance_extremes() {
        let mut rng = SessionRng::new(42);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = SessionRng::new(42);
        for _ in 0..100 {
            rng.next_u32();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SessionRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u32(), restored.next_u32());
        }
    }
}
