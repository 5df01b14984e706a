//! Backing store trait.
//!
//! This module defines the `BackingStore` trait implemented by whatever sits
//! below the second-level cache. It provides:
//! 1. **Identification:** `size` for range checks.
//! 2. **Access:** Uncached byte-range reads, full writes and masked writes.
//! 3. **Line Fill:** A convenience read of one aligned cache line.
//!
//! Implementors may assume every range they are handed lies inside
//! `[0, size)`; the hierarchy checks addresses before reaching this layer.

use crate::common::PhysAddr;

/// Raw, uncached storage under the cache hierarchy.
pub trait BackingStore {
    /// Returns the number of addressable bytes.
    fn size(&self) -> u64;

    /// Reads `buf.len()` bytes starting at `addr`.
    fn read(&self, addr: PhysAddr, buf: &mut [u8]);

    /// Writes all of `data` starting at `addr`.
    fn write(&mut self, addr: PhysAddr, data: &[u8]);

    /// Writes `data[i]` at `addr + i` wherever `mask[i]` is set
    /// (default: byte-by-byte through [`write`](Self::write)).
    fn write_masked(&mut self, addr: PhysAddr, data: &[u8], mask: &[bool]) {
        for (i, (&byte, &m)) in data.iter().zip(mask).enumerate() {
            if m {
                self.write(addr.add(i as u64), &[byte]);
            }
        }
    }

    /// Fills `line` with the line-aligned block containing `addr`.
    fn fill_line(&self, addr: PhysAddr, line: &mut [u8]) {
        self.read(addr.align_down(line.len() as u64), line);
    }
}
