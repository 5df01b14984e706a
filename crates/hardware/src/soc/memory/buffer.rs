//! DRAM Buffer Implementation.
//!
//! This module provides the raw byte storage behind the backing store. The
//! buffer is zero-initialised through the allocator's zeroed path, so a
//! 128 MiB store costs no host memory until its pages are touched.

use std::fmt;

/// A bounds-checked byte buffer.
pub struct DramBuffer {
    bytes: Vec<u8>,
}

impl DramBuffer {
    /// Creates a new zero-filled DRAM buffer of the specified size.
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the buffer in bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-sized buffer.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads a single byte.
    pub fn read_u8(&self, offset: usize) -> u8 {
        assert!(offset < self.len(), "DRAM read out of bounds");
        self.bytes[offset]
    }

    /// Reads a slice of memory.
    pub fn read_slice(&self, offset: usize, len: usize) -> &[u8] {
        assert!(offset + len <= self.len(), "DRAM read out of bounds");
        &self.bytes[offset..offset + len]
    }

    /// Writes a slice of memory.
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) {
        assert!(offset + data.len() <= self.len(), "DRAM write out of bounds");
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Returns a mutable view of a range, for masked updates.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        assert!(offset + len <= self.len(), "DRAM write out of bounds");
        &mut self.bytes[offset..offset + len]
    }
}

impl fmt::Debug for DramBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DramBuffer").field("size", &self.len()).finish()
    }
}
