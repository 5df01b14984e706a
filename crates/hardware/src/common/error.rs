//! Error definitions and the fatal address check.
//!
//! This module defines the two failure classes of the hierarchy:
//! 1. **Configuration Errors:** Recoverable, returned while building a hierarchy.
//! 2. **Fatal Address Check:** An out-of-range physical address is a caller defect and halts.
//!
//! Cache-state invariants are not represented here; they are guarded by
//! debug assertions at the point of mutation.

use thiserror::Error;

use super::addr::PhysAddr;

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for the config schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The physical address width is zero or too wide to model.
    #[error("physical address width must be in 1..={max} bits, got {bits}")]
    AddressWidth {
        /// Configured width.
        bits: u32,
        /// Largest supported width.
        max: u32,
    },

    /// Offset, tag-low and set-index fields do not fit in the address.
    #[error("{level}: offset/tag-low/set-index widths use {used} bits but addresses have {available}")]
    FieldWidths {
        /// Cache level name.
        level: &'static str,
        /// Sum of the configured field widths.
        used: u64,
        /// Physical address width.
        available: u32,
    },

    /// A cache level was configured with no ways.
    #[error("{level}: associativity must be at least 1")]
    ZeroWays {
        /// Cache level name.
        level: &'static str,
    },

    /// `sets * ways * line_bytes` exceeds the per-level storage limit.
    #[error("{level}: data array is larger than {max} bytes")]
    CacheTooLarge {
        /// Cache level name.
        level: &'static str,
        /// Largest accepted data array in bytes.
        max: u64,
    },

    /// The burst length is not a power of two or is narrower than a word access.
    #[error("burst length must be a power of two of at least {min} bytes, got {len}")]
    BurstLength {
        /// Configured burst length.
        len: usize,
        /// Smallest burst that holds one word access.
        min: usize,
    },

    /// A burst would not fit inside one line of a level.
    #[error("{level}: burst of {burst} bytes does not fit in a {line}-byte line")]
    BurstExceedsLine {
        /// Cache level name.
        level: &'static str,
        /// Burst length in bytes.
        burst: usize,
        /// Line size in bytes.
        line: usize,
    },

    /// The supplied backing store cannot hold the configured address space.
    #[error("backing store holds {actual} bytes but the address space needs {expected}")]
    BackingStoreSize {
        /// `2^addr_bits`.
        expected: u64,
        /// `BackingStore::size()` of the supplied store.
        actual: u64,
    },

    /// L1 lines must be windows of a single L2 line.
    #[error("L1 line ({l1} bytes) is larger than L2 line ({l2} bytes)")]
    L1LineTooLarge {
        /// L1 line size in bytes.
        l1: usize,
        /// L2 line size in bytes.
        l2: usize,
    },
}

/// Halts the simulation if `addr` lies outside of physical memory.
///
/// An out-of-range address means the address generation upstream is broken,
/// so there is nothing to retry and no partial result to hand back.
///
/// # Panics
///
/// Panics when `addr >= mem_size`, naming the offending address.
#[track_caller]
#[inline]
pub fn check_phys_addr(addr: PhysAddr, mem_size: u64) {
    assert!(
        addr.val() < mem_size,
        "physical address {addr} is outside of the physical memory!"
    );
}
