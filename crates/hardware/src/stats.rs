//! Cache hierarchy statistics collection and reporting.
//!
//! This module tracks what the hierarchy did with each access. It provides:
//! 1. **Per-level counters:** Read/write hits and misses, evictions, dirty write-backs.
//! 2. **Assembler counters:** Accesses that were split across a burst boundary.
//! 3. **Reporting:** Hit rates and a plain-text report via `Display`.

use std::fmt;

use serde::Serialize;

/// Counters for a single cache level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Burst reads served from a valid matching line.
    pub read_hits: u64,
    /// Burst reads that had to fill a line from the level below.
    pub read_misses: u64,
    /// Burst writes that found a valid matching line.
    pub write_hits: u64,
    /// Burst writes that found no matching line.
    pub write_misses: u64,
    /// Lines displaced by random replacement.
    pub evictions: u64,
    /// Dirty lines written back to the backing store (write-back levels only).
    pub writebacks: u64,
}

impl CacheStats {
    /// Total number of burst accesses seen by this level.
    pub const fn accesses(&self) -> u64 {
        self.read_hits + self.read_misses + self.write_hits + self.write_misses
    }

    /// Total number of hits (reads and writes).
    pub const fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Fraction of accesses that hit, in `[0, 1]`. Zero when idle.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

/// Statistics for the whole hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyStats {
    /// First-level cache counters.
    pub l1: CacheStats,
    /// Second-level cache counters.
    pub l2: CacheStats,
    /// Loads and stores that straddled a burst boundary and took two bursts.
    pub burst_splits: u64,
}

impl fmt::Display for HierarchyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "CACHE HIERARCHY STATISTICS")?;
        writeln!(f, "==========================================================")?;
        for (name, s) in [("L1", &self.l1), ("L2", &self.l2)] {
            writeln!(
                f,
                "  {:<3} accesses: {:<10} | hits: {:<10} | hit_rate: {:.2}%",
                name,
                s.accesses(),
                s.hits(),
                s.hit_rate() * 100.0
            )?;
            writeln!(
                f,
                "      reads: {}/{} (hit/miss)  writes: {}/{} (hit/miss)",
                s.read_hits, s.read_misses, s.write_hits, s.write_misses
            )?;
            writeln!(
                f,
                "      evictions: {:<8} writebacks: {}",
                s.evictions, s.writebacks
            )?;
        }
        writeln!(f, "----------------------------------------------------------")?;
        write!(f, "  burst splits            {}", self.burst_splits)
    }
}
