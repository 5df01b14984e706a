//! Second-Level Cache.
//!
//! The L2 is write-back and write-allocate. It is the only level that holds
//! dirty data and the only writer of whole lines to the backing store:
//! a dirty line is written back, in full and at the address rebuilt from its
//! tag and set, when random replacement picks it as a victim or when the
//! hierarchy is flushed.
//!
//! Every access resolves to exactly one of hit, free-way fill or eviction
//! fill. A free-way fill returns without consulting the replacement policy.

use tracing::{debug, trace};

use super::geometry::{AddrFields, CacheGeometry};
use super::policies::ReplacementPolicy;
use super::{CacheArray, LineProbe, Placement};
use crate::common::{PhysAddr, check_phys_addr};
use crate::core::units::lsu::masked_copy;
use crate::soc::traits::BackingStore;
use crate::stats::CacheStats;

/// Write-back, write-allocate second-level cache.
#[derive(Debug)]
pub struct L2Cache {
    array: CacheArray,
    burst_len: usize,
    mem_size: u64,
    stats: CacheStats,
}

impl L2Cache {
    /// Creates an L2 with every line invalid and clean.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Field widths of L2 addresses.
    /// * `ways` - Associativity.
    /// * `burst_len` - Bytes returned to L1 per read.
    /// * `policy` - Victim selection for full sets.
    pub fn new(
        geometry: CacheGeometry,
        ways: usize,
        burst_len: usize,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        Self {
            mem_size: geometry.memory_size(),
            array: CacheArray::new(geometry, ways, policy),
            burst_len,
            stats: CacheStats::default(),
        }
    }

    /// Underlying storage, for inspection.
    pub const fn array(&self) -> &CacheArray {
        &self.array
    }

    /// Access counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Clears the access counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Invalidates every line and clears every dirty bit. Dirty data is dropped.
    pub fn invalidate_all(&mut self) {
        self.array.invalidate_all();
    }

    /// Writes the line at (`set`, `way`) back if it is dirty.
    ///
    /// The whole line goes to its aligned base; the line stays valid and
    /// becomes clean.
    ///
    /// # Returns
    ///
    /// `true` if a write-back happened.
    fn write_back<B: BackingStore + ?Sized>(&mut self, set: usize, way: usize, mem: &mut B) -> bool {
        let line = *self.array.line(set, way);
        if !(line.valid && line.dirty) {
            return false;
        }
        let base = self.array.geometry().line_base(line.tag, set);
        debug!(set, way, addr = %base, "L2 write-back of dirty line");
        mem.write(base, self.array.data(set, way));
        self.array.line_mut(set, way).dirty = false;
        self.stats.writebacks += 1;
        true
    }

    /// Finds or makes room for the line addressed by `fields`.
    ///
    /// On a miss the line is installed clean and filled from the backing
    /// store; a dirty victim is written back first.
    ///
    /// # Returns
    ///
    /// `(way, hit)`.
    fn acquire<B: BackingStore + ?Sized>(&mut self, fields: &AddrFields, mem: &mut B) -> (usize, bool) {
        let set = fields.set;
        let tag = fields.tag();
        let placement = self.array.place(set, tag);
        match placement {
            Placement::Hit(way) => return (way, true),
            Placement::Free(way) => trace!(set, way, "L2 fill into free way"),
            Placement::Evict(way) => {
                self.stats.evictions += 1;
                let _ = self.write_back(set, way, mem);
                debug!(set, way, "L2 evicting line");
            }
        }
        let way = placement.way();
        self.array.install(set, way, tag);
        let base = self.array.geometry().line_base(tag, set);
        mem.fill_line(base, self.array.data_mut(set, way));
        (way, false)
    }

    /// Serves an L1 read miss.
    ///
    /// Copies the burst at `addr` into `out` and the L1-line-sized window of
    /// the L2 line that contains `addr` into `l1_line`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the requested burst (aligned down internally).
    /// * `out` - Destination for one burst of data.
    /// * `l1_line` - The L1 way being filled.
    /// * `mem` - Backing store.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is outside physical memory.
    pub fn read_fill<B: BackingStore + ?Sized>(
        &mut self,
        addr: PhysAddr,
        out: &mut [u8],
        l1_line: &mut [u8],
        mem: &mut B,
    ) {
        check_phys_addr(addr, self.mem_size);
        let base = addr.align_down(self.burst_len as u64);
        let fields = self.array.decompose(base);
        let (way, hit) = self.acquire(&fields, mem);
        if hit {
            self.stats.read_hits += 1;
        } else {
            self.stats.read_misses += 1;
        }

        let data = self.array.data(fields.set, way);
        out.copy_from_slice(&data[fields.offset..fields.offset + out.len()]);
        let window = fields.offset & !(l1_line.len() - 1);
        l1_line.copy_from_slice(&data[window..window + l1_line.len()]);
        self.array.debug_check_set(fields.set);
    }

    /// Applies a masked burst write.
    ///
    /// The address is aligned down to the write length. On a miss the line is
    /// allocated and filled first. The line is left dirty either way; the
    /// backing store is not touched unless a dirty victim had to go.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is outside physical memory.
    pub fn write_burst<B: BackingStore + ?Sized>(
        &mut self,
        addr: PhysAddr,
        data: &[u8],
        mask: &[bool],
        mem: &mut B,
    ) {
        check_phys_addr(addr, self.mem_size);
        let base = addr.align_down(data.len() as u64);
        let fields = self.array.decompose(base);
        let (way, hit) = self.acquire(&fields, mem);
        if hit {
            self.stats.write_hits += 1;
        } else {
            self.stats.write_misses += 1;
        }

        let (line, bytes) = self.array.entry_mut(fields.set, way);
        masked_copy(&mut bytes[fields.offset..fields.offset + data.len()], data, mask);
        line.dirty = true;
        self.array.debug_check_set(fields.set);
    }

    /// Writes every dirty line back and marks it clean. Lines stay valid.
    ///
    /// # Returns
    ///
    /// The number of lines written back.
    pub fn flush<B: BackingStore + ?Sized>(&mut self, mem: &mut B) -> usize {
        let sets = self.array.geometry().num_sets();
        let ways = self.array.ways();
        let mut written = 0;
        for set in 0..sets {
            for way in 0..ways {
                if self.write_back(set, way, mem) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Reports the line holding `addr`, if any, without side effects.
    pub fn probe(&self, addr: PhysAddr, len: usize) -> Option<LineProbe> {
        self.array.probe(addr, len)
    }
}
