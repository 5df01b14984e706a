//! Cache Replacement Policies.
//!
//! Victim selection for a set with no free way. Both levels replace
//! uniformly at random; the trait keeps the choice swappable so tests can
//! script which way is evicted.

/// Random replacement policy.
pub mod random;

use std::fmt;

pub use random::{RandomPolicy, entropy_seed};

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Updates the policy state when a line is accessed.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Selects a victim line to evict from a specific set.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&mut self, set: usize) -> usize;
}
