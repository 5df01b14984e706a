//! Random Replacement Policy.
//!
//! This policy evicts a uniformly chosen way from the set. It uses a
//! xorshift generator seeded once at construction and carried across calls,
//! so consecutive evictions within the same wall-clock second still pick
//! independent ways.

use std::time::{SystemTime, UNIX_EPOCH};

use super::ReplacementPolicy;

/// Random Policy state.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    /// Number of ways in the cache.
    ways: usize,
    /// Internal state for the pseudo-random number generator. Never zero.
    state: u64,
}

/// Scrambles a user seed so that small or zero seeds still give a usable
/// xorshift state.
const fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the cache.
    /// * `seed` - Generator seed; the same seed replays the same victim sequence.
    pub const fn new(ways: usize, seed: u64) -> Self {
        let state = splitmix64(seed);
        Self {
            ways,
            state: if state == 0 { 0x2545_F491_4F6C_DD1D } else { state },
        }
    }
}

/// Returns a seed taken from the wall clock at nanosecond resolution.
///
/// Called once when a hierarchy is built without an explicit seed.
pub fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

impl ReplacementPolicy for RandomPolicy {
    /// Access patterns do not affect random replacement.
    fn update(&mut self, _set: usize, _way: usize) {}

    /// Generates a pseudo-random number and maps it to a valid way index.
    fn get_victim(&mut self, _set: usize) -> usize {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x as usize) % self.ways
    }
}
