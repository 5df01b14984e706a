//! Physical System Memory (DRAM).
//!
//! This module implements the backing store under the cache hierarchy. It provides:
//! 1. **Buffer:** Zero-initialised byte storage (`DramBuffer`) for RAM contents.
//! 2. **Memory:** `BackingStore` implementation with full and masked writes.
//! 3. **Loading:** Placing an image into RAM before simulation, bypassing the caches.

/// DRAM buffer implementation for raw byte storage.
pub mod buffer;

use self::buffer::DramBuffer;
use crate::common::PhysAddr;
use crate::core::units::lsu::masked_copy;
use crate::soc::traits::BackingStore;

/// System Memory structure.
#[derive(Debug)]
pub struct Memory {
    buffer: DramBuffer,
}

impl Memory {
    /// Creates a zero-filled memory of `size` bytes.
    pub fn new(size: u64) -> Self {
        Self {
            buffer: DramBuffer::new(size as usize),
        }
    }

    /// Loads a byte slice into memory at a specific offset.
    ///
    /// Used for program images or test fixtures. Data that would run past
    /// the end of memory is rejected as a whole.
    ///
    /// # Returns
    ///
    /// `true` if the image was written.
    pub fn load(&mut self, data: &[u8], offset: usize) -> bool {
        if offset
            .checked_add(data.len())
            .is_some_and(|end| end <= self.buffer.len())
        {
            self.buffer.write_slice(offset, data);
            true
        } else {
            false
        }
    }

    /// Reads a byte without going through any cache.
    pub fn read_u8(&self, addr: PhysAddr) -> u8 {
        self.buffer.read_u8(addr.val() as usize)
    }

    /// Reads a little-endian word without going through any cache.
    pub fn read_u32(&self, addr: PhysAddr) -> u32 {
        let slice = self.buffer.read_slice(addr.val() as usize, 4);
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(slice);
        u32::from_le_bytes(bytes)
    }
}

impl BackingStore for Memory {
    fn size(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn read(&self, addr: PhysAddr, buf: &mut [u8]) {
        buf.copy_from_slice(self.buffer.read_slice(addr.val() as usize, buf.len()));
    }

    fn write(&mut self, addr: PhysAddr, data: &[u8]) {
        self.buffer.write_slice(addr.val() as usize, data);
    }

    fn write_masked(&mut self, addr: PhysAddr, data: &[u8], mask: &[bool]) {
        masked_copy(self.buffer.slice_mut(addr.val() as usize, data.len()), data, mask);
    }
}
