//! Seeded, reproducible shuffling.
//!
//! The swap index for position `i` is a pure function of `(seed, i)`, so the
//! same seed always produces the same ordering on every platform. This is not
//! a cryptographic RNG; it only has to spread orderings well across seeds.

use rand::Rng;

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Returns a permuted copy of `items`. The input is left untouched.
pub fn shuffle<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = swap_index(seed, i);
        out.swap(i, j);
    }
    out
}

/// Draws a fresh seed for a new attempt.
pub fn draw_seed() -> u64 {
    rand::thread_rng().gen()
}

// Index in [0, i].
fn swap_index(seed: u64, i: usize) -> usize {
    let step = (i as u64).wrapping_add(1).wrapping_mul(GOLDEN_GAMMA);
    let bound = i as u64 + 1;
    (mix(seed.wrapping_add(step)) % bound) as usize
}

// splitmix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
