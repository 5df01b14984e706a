//! First-Level Cache.
//!
//! The L1 is write-through and no-write-allocate, and never holds dirty data.
//!
//! - **Read:** a hit copies one burst out of the line. A miss claims a free
//!   way, or a random victim when the set is full, and has the L2 fill it.
//!   Victims need no write-back.
//! - **Write hit:** the masked burst goes into the L1 line, then to the L2,
//!   and also straight to the backing store.
//! - **Write miss:** no L1 line is allocated; the burst goes to the L2 only.

use tracing::trace;

use super::geometry::CacheGeometry;
use super::l2::L2Cache;
use super::policies::ReplacementPolicy;
use super::{CacheArray, LineProbe, Placement};
use crate::common::{PhysAddr, check_phys_addr};
use crate::core::units::lsu::masked_copy;
use crate::soc::traits::BackingStore;
use crate::stats::CacheStats;

/// Write-through, no-write-allocate first-level cache.
#[derive(Debug)]
pub struct L1Cache {
    array: CacheArray,
    burst_len: usize,
    mem_size: u64,
    stats: CacheStats,
}

impl L1Cache {
    /// Creates an L1 with every line invalid.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Field widths of L1 addresses.
    /// * `ways` - Associativity.
    /// * `burst_len` - Bytes moved per read or write.
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

    /// Invalidates every line.
    pub fn invalidate_all(&mut self) {
        self.array.invalidate_all();
    }

    /// Reads the burst containing `addr` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is outside physical memory.
    pub fn read_burst<B: BackingStore + ?Sized>(
        &mut self,
        addr: PhysAddr,
        out: &mut [u8],
        l2: &mut L2Cache,
        mem: &mut B,
    ) {
        check_phys_addr(addr, self.mem_size);
        let base = addr.align_down(self.burst_len as u64);
        let fields = self.array.decompose(base);
        let placement = self.array.place(fields.set, fields.tag());

        match placement {
            Placement::Hit(way) => {
                self.stats.read_hits += 1;
                let data = self.array.data(fields.set, way);
                out.copy_from_slice(&data[fields.offset..fields.offset + out.len()]);
                return;
            }
            Placement::Free(way) => trace!(set = fields.set, way, "L1 fill into free way"),
            Placement::Evict(way) => {
                self.stats.evictions += 1;
                trace!(set = fields.set, way, "L1 replacing line");
            }
        }

        self.stats.read_misses += 1;
        let way = placement.way();
        self.array.install(fields.set, way, fields.tag());
        l2.read_fill(base, out, self.array.data_mut(fields.set, way), mem);
        self.array.debug_check_set(fields.set);
    }

    /// Writes a masked burst at `addr` through to the L2.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is outside physical memory.
    pub fn write_burst<B: BackingStore + ?Sized>(
        &mut self,
        addr: PhysAddr,
        data: &[u8],
        mask: &[bool],
        l2: &mut L2Cache,
        mem: &mut B,
    ) {
        check_phys_addr(addr, self.mem_size);
        let base = addr.align_down(self.burst_len as u64);
        let fields = self.array.decompose(base);

        if let Some(way) = self.array.lookup(fields.set, fields.tag()) {
            self.stats.write_hits += 1;
            let line = self.array.data_mut(fields.set, way);
            masked_copy(&mut line[fields.offset..fields.offset + data.len()], data, mask);
            l2.write_burst(base, data, mask, mem);
            mem.write_masked(base, data, mask);
        } else {
            self.stats.write_misses += 1;
            l2.write_burst(base, data, mask, mem);
        }
        self.array.debug_check_set(fields.set);
    }

    /// Reports the line holding `addr`, if any, without side effects.
    pub fn probe(&self, addr: PhysAddr, len: usize) -> Option<LineProbe> {
        self.array.probe(addr, len)
    }
}
