//! Set-Associative Cache Storage.
//!
//! This module holds the storage shared by both cache levels: a fixed
//! `sets × ways` array of lines with their tags, valid/dirty bits and data.
//! It provides:
//! 1. **Lookup:** Tag match across every way of a set.
//! 2. **Placement:** Hit, free-way fill, or random eviction, decided once per access.
//! 3. **Inspection:** Non-mutating probes used by the debugger surface.
//!
//! The level-specific policies (write-through/no-write-allocate for L1,
//! write-back/write-allocate for L2) live in [`l1`] and [`l2`].

/// Address decomposition into offset, tag-low, set index and tag-high.
pub mod geometry;

/// First-level cache: write-through, no-write-allocate.
pub mod l1;

/// Second-level cache: write-back, write-allocate.
pub mod l2;

/// Cache replacement policy implementations.
pub mod policies;

use std::fmt;

use self::geometry::{AddrFields, CacheGeometry, Tag};
use self::policies::ReplacementPolicy;
use crate::common::PhysAddr;
use crate::common::constants::MAX_ACCESS_BYTES;

pub use self::l1::L1Cache;
pub use self::l2::L2Cache;

/// Cache line metadata: tag, validity, and dirty bits.
///
/// The line's bytes live in the owning [`CacheArray`] so that a whole level
/// is two flat allocations regardless of its size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Tag of the address range held by this line.
    pub tag: Tag,
    /// Line holds data for `tag`.
    pub valid: bool,
    /// Line content may differ from the backing store. Always false in L1.
    pub dirty: bool,
}

/// Outcome of looking for a slot for an address in its set.
///
/// Exactly one of these is produced per access, so a free-way fill can
/// never be followed by an eviction in the same operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A valid line with a matching tag is at this way.
    Hit(usize),
    /// No match; this way was invalid and can be filled.
    Free(usize),
    /// No match and no free way; this way was picked by the replacement policy.
    Evict(usize),
}

impl Placement {
    /// The way selected by this placement.
    pub const fn way(self) -> usize {
        match self {
            Self::Hit(way) | Self::Free(way) | Self::Evict(way) => way,
        }
    }
}

/// Snapshot of a line found by a debug probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineProbe {
    /// Set index of the line.
    pub set: usize,
    /// Way holding the line.
    pub way: usize,
    /// Tag stored with the line.
    pub tag: Tag,
    /// Dirty bit (always false for L1).
    pub dirty: bool,
    /// Little-endian value of the probed bytes.
    pub content: u32,
    /// Number of bytes in `content`; fewer than requested when the probe
    /// ran past the end of the line.
    pub len: usize,
}

impl fmt::Display for LineProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "content = {:#x} ({} bytes), set = {}, way = {}, tag = ({:#x}, {:#x})",
            self.content, self.len, self.set, self.way, self.tag.high, self.tag.low
        )?;
        if self.dirty {
            write!(f, ", dirty")?;
        }
        Ok(())
    }
}

/// Set-associative storage for one cache level.
#[derive(Debug)]
pub struct CacheArray {
    geometry: CacheGeometry,
    ways: usize,
    lines: Vec<CacheLine>,
    data: Vec<u8>,
    policy: Box<dyn ReplacementPolicy>,
}

impl CacheArray {
    /// Creates an array with every line invalid.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Field widths of this level's addresses.
    /// * `ways` - Associativity; independent of the tag-low field width.
    /// * `policy` - Victim selection when a set is full.
    pub fn new(geometry: CacheGeometry, ways: usize, policy: Box<dyn ReplacementPolicy>) -> Self {
        let num_lines = geometry.num_sets() * ways;
        Self {
            geometry,
            ways,
            lines: vec![CacheLine::default(); num_lines],
            data: vec![0; num_lines * geometry.line_bytes()],
            policy,
        }
    }

    /// Address decomposer for this level.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.geometry.line_bytes()
    }

    /// Splits `addr` with this level's geometry.
    #[inline]
    pub const fn decompose(&self, addr: PhysAddr) -> AddrFields {
        self.geometry.decompose(addr)
    }

    #[inline(always)]
    const fn index(&self, set: usize, way: usize) -> usize {
        set * self.ways + way
    }

    /// Marks every line invalid and clean.
    pub fn invalidate_all(&mut self) {
        self.lines.fill(CacheLine::default());
    }

    /// Metadata of the line at (`set`, `way`).
    pub fn line(&self, set: usize, way: usize) -> &CacheLine {
        &self.lines[self.index(set, way)]
    }

    /// Mutable metadata of the line at (`set`, `way`).
    pub fn line_mut(&mut self, set: usize, way: usize) -> &mut CacheLine {
        let idx = self.index(set, way);
        &mut self.lines[idx]
    }

    /// Bytes of the line at (`set`, `way`).
    pub fn data(&self, set: usize, way: usize) -> &[u8] {
        let len = self.line_bytes();
        let start = self.index(set, way) * len;
        &self.data[start..start + len]
    }

    /// Mutable bytes of the line at (`set`, `way`).
    pub fn data_mut(&mut self, set: usize, way: usize) -> &mut [u8] {
        let len = self.line_bytes();
        let start = self.index(set, way) * len;
        &mut self.data[start..start + len]
    }

    /// Metadata and mutable bytes of one line at once.
    pub fn entry_mut(&mut self, set: usize, way: usize) -> (&mut CacheLine, &mut [u8]) {
        let idx = self.index(set, way);
        let len = self.line_bytes();
        (
            &mut self.lines[idx],
            &mut self.data[idx * len..(idx + 1) * len],
        )
    }

    /// Returns the way holding a valid line tagged `tag` in `set`.
    ///
    /// Every way of the set is scanned.
    pub fn lookup(&self, set: usize, tag: Tag) -> Option<usize> {
        let base = self.index(set, 0);
        self.lines[base..base + self.ways]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Returns the lowest-numbered invalid way of `set`.
    pub fn find_free(&self, set: usize) -> Option<usize> {
        let base = self.index(set, 0);
        self.lines[base..base + self.ways]
            .iter()
            .position(|line| !line.valid)
    }

    /// Decides where the line for (`set`, `tag`) lives or will live.
    ///
    /// Checked in order: tag hit, first free way, policy victim. The policy
    /// is consulted only when the set is full.
    pub fn place(&mut self, set: usize, tag: Tag) -> Placement {
        if let Some(way) = self.lookup(set, tag) {
            self.policy.update(set, way);
            return Placement::Hit(way);
        }
        if let Some(way) = self.find_free(set) {
            self.policy.update(set, way);
            return Placement::Free(way);
        }
        let way = self.policy.get_victim(set);
        debug_assert!(way < self.ways, "replacement policy returned way {way} of {}", self.ways);
        self.policy.update(set, way);
        Placement::Evict(way)
    }

    /// Retags the line at (`set`, `way`) as valid and clean for `tag`.
    ///
    /// The data is left for the caller to fill.
    pub fn install(&mut self, set: usize, way: usize, tag: Tag) {
        *self.line_mut(set, way) = CacheLine {
            tag,
            valid: true,
            dirty: false,
        };
    }

    /// Reads up to `len` bytes of the line holding `addr` without touching
    /// replacement state.
    ///
    /// Addresses outside the address space never match, even though their
    /// low bits would decompose onto a resident line.
    pub fn probe(&self, addr: PhysAddr, len: usize) -> Option<LineProbe> {
        if addr.val() >= self.geometry.memory_size() {
            return None;
        }
        let fields = self.decompose(addr);
        let way = self.lookup(fields.set, fields.tag())?;
        let line = self.line(fields.set, way);
        let data = self.data(fields.set, way);
        let len = len.min(MAX_ACCESS_BYTES).min(data.len() - fields.offset);
        let mut bytes = [0u8; MAX_ACCESS_BYTES];
        bytes[..len].copy_from_slice(&data[fields.offset..fields.offset + len]);
        Some(LineProbe {
            set: fields.set,
            way,
            tag: line.tag,
            dirty: line.dirty,
            content: u32::from_le_bytes(bytes),
            len,
        })
    }

    /// Asserts the per-set invariants in debug builds.
    ///
    /// No two valid lines of a set share a tag, and only valid lines are dirty.
    /// L1 never sets the dirty bit, so this also keeps L1 clean.
    pub fn debug_check_set(&self, set: usize) {
        if cfg!(debug_assertions) {
            let base = self.index(set, 0);
            let lines = &self.lines[base..base + self.ways];
            for (i, a) in lines.iter().enumerate() {
                debug_assert!(a.valid || !a.dirty, "set {set} way {i}: dirty but invalid");
                if !a.valid {
                    continue;
                }
                for (j, b) in lines.iter().enumerate().skip(i + 1) {
                    debug_assert!(
                        !(b.valid && b.tag == a.tag),
                        "set {set}: ways {i} and {j} both hold tag {:?}",
                        a.tag
                    );
                }
            }
        }
    }
}
