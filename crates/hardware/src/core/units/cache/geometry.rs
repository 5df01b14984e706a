//! Address decomposition.
//!
//! A physical address is split, per cache level, into four contiguous bit
//! fields ordered from least to most significant:
//!
//! ```text
//!  MSB                                              LSB
//! +-----------+-------------+-----------+------------+
//! | tag_high  |  set index  |  tag_low  |   offset   |
//! |  F bits   |   R bits    |  Q bits   |   W bits   |
//! +-----------+-------------+-----------+------------+
//! ```
//!
//! `(tag_high, tag_low)` form the tag. Two addresses map to the same line
//! iff their tag and set index match.

use crate::common::PhysAddr;

/// Field widths of one cache level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    offset_bits: u32,
    tag_low_bits: u32,
    set_bits: u32,
    tag_high_bits: u32,
}

/// Tag stored alongside a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Bits above the set index.
    pub high: u64,
    /// Bits between the offset and the set index.
    pub low: u64,
}

/// An address split into its four fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrFields {
    /// Byte position within the line.
    pub offset: usize,
    /// Tag-low field.
    pub tag_low: u64,
    /// Set index.
    pub set: usize,
    /// Tag-high field.
    pub tag_high: u64,
}

impl AddrFields {
    /// Returns the tag formed by the two tag fields.
    #[inline]
    pub const fn tag(&self) -> Tag {
        Tag {
            high: self.tag_high,
            low: self.tag_low,
        }
    }
}

#[inline(always)]
const fn low_mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

impl CacheGeometry {
    /// Creates a geometry from the four field widths (W, Q, R, F).
    pub const fn new(offset_bits: u32, tag_low_bits: u32, set_bits: u32, tag_high_bits: u32) -> Self {
        Self {
            offset_bits,
            tag_low_bits,
            set_bits,
            tag_high_bits,
        }
    }

    /// Total address width covered by the four fields.
    pub const fn addr_bits(&self) -> u32 {
        self.offset_bits + self.tag_low_bits + self.set_bits + self.tag_high_bits
    }

    /// Size of the physical address space in bytes.
    pub const fn memory_size(&self) -> u64 {
        1u64 << self.addr_bits()
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        1 << self.offset_bits
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        1 << self.set_bits
    }

    /// Splits `addr` into offset, tag-low, set index and tag-high.
    pub const fn decompose(&self, addr: PhysAddr) -> AddrFields {
        let raw = addr.val();
        let q_shift = self.offset_bits;
        let r_shift = q_shift + self.tag_low_bits;
        let f_shift = r_shift + self.set_bits;
        AddrFields {
            offset: (raw & low_mask(self.offset_bits)) as usize,
            tag_low: (raw >> q_shift) & low_mask(self.tag_low_bits),
            set: ((raw >> r_shift) & low_mask(self.set_bits)) as usize,
            tag_high: (raw >> f_shift) & low_mask(self.tag_high_bits),
        }
    }

    /// Reassembles an address from its fields.
    pub const fn compose(&self, fields: &AddrFields) -> PhysAddr {
        let q_shift = self.offset_bits;
        let r_shift = q_shift + self.tag_low_bits;
        let f_shift = r_shift + self.set_bits;
        PhysAddr::new(
            (fields.offset as u64 & low_mask(self.offset_bits))
                | ((fields.tag_low & low_mask(self.tag_low_bits)) << q_shift)
                | ((fields.set as u64 & low_mask(self.set_bits)) << r_shift)
                | ((fields.tag_high & low_mask(self.tag_high_bits)) << f_shift),
        )
    }

    /// Base address of the line holding `tag` in `set` (offset forced to zero).
    ///
    /// This is where a dirty line is written back on eviction.
    pub const fn line_base(&self, tag: Tag, set: usize) -> PhysAddr {
        self.compose(&AddrFields {
            offset: 0,
            tag_low: tag.low,
            set,
            tag_high: tag.high,
        })
    }
}
