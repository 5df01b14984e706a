//! Physical address type.
//!
//! This module defines a strong type for physical addresses so raw integers
//! and cache-relative offsets are not mixed up. It provides:
//! 1. **Type Safety:** Keeps physical addresses distinct from byte counts and field values.
//! 2. **Alignment:** Helpers for aligning down to a burst or line boundary.
//! 3. **Arithmetic:** Offsetting by a byte count when a transfer spills into the next burst.

use std::fmt;

/// A physical address in the simulated backing store.
///
/// Valid physical addresses lie in `[0, MemorySize)`; the hierarchy checks
/// this before every burst operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw 64-bit address value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Aligns the address down to a multiple of `unit`.
    ///
    /// `unit` must be a power of two (burst length or line size).
    #[inline]
    pub const fn align_down(self, unit: u64) -> Self {
        Self(self.0 & !(unit - 1))
    }

    /// Returns the byte offset of this address within a `unit`-sized block.
    #[inline]
    pub const fn offset_in(self, unit: u64) -> u64 {
        self.0 & (unit - 1)
    }

    /// Returns the address `bytes` further on.
    #[inline]
    pub const fn add(self, bytes: u64) -> Self {
        Self(self.0 + bytes)
    }
}

impl From<u64> for PhysAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
