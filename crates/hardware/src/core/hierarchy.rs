//! Two-level memory hierarchy.
//!
//! This module ties the burst assembler, both cache levels and the backing
//! store into the surface a load/store unit talks to. It provides:
//! 1. **Accesses:** `read` and `write` of 1, 2 or 4 bytes at any address.
//! 2. **Lifecycle:** `init_caches` invalidates both levels; `flush` writes dirty L2 lines back.
//! 3. **Inspection:** Side-effect-free probes of either level and access statistics.
//!
//! Data flow for a load is assembler → L1 → (miss) L2 → (miss) backing store,
//! filling back up the chain. A store goes assembler → L1 (write-through) →
//! L2 (write-back, marks dirty); the backing store sees it immediately only
//! on an L1 hit, otherwise when the dirty L2 line is evicted or flushed.
//!
//! The hierarchy is single-threaded state owned by one caller. Sharing it
//! between threads needs one lock around the whole value, since L1 fills
//! reach into L2 and L2 writes reach into the backing store.

use tracing::info;

use crate::common::constants::ACCESS_WIDTHS;
use crate::common::{ConfigError, PhysAddr, check_phys_addr};
use crate::config::Config;
use crate::core::units::cache::policies::{RandomPolicy, ReplacementPolicy, entropy_seed};
use crate::core::units::cache::{L1Cache, L2Cache, LineProbe};
use crate::core::units::lsu::{crosses_burst, split_read, split_write};
use crate::soc::memory::Memory;
use crate::soc::traits::BackingStore;
use crate::stats::HierarchyStats;

/// Mixed into the seed of the L2 generator so the two levels do not pick
/// victims in lockstep.
const L2_SEED_SALT: u64 = 0x5851_F42D_4C95_7F2D;

/// L1 + L2 + backing store.
#[derive(Debug)]
pub struct MemoryHierarchy<B: BackingStore = Memory> {
    l1: L1Cache,
    l2: L2Cache,
    mem: B,
    burst_len: usize,
    mem_size: u64,
    burst_splits: u64,
}

impl MemoryHierarchy<Memory> {
    /// Builds a hierarchy over a fresh zero-filled DRAM of `2^addr_bits` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::build(config, Memory::new(config.memory_size()), None)
    }
}

impl<B: BackingStore> MemoryHierarchy<B> {
    /// Builds a hierarchy over a caller-supplied backing store.
    ///
    /// Both levels replace uniformly at random, seeded once here from
    /// `config.general.seed` or the wall clock.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails validation or `mem` is
    /// smaller than the configured address space.
    pub fn with_backing(config: &Config, mem: B) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::build(config, mem, None)
    }

    /// Builds a hierarchy with explicit replacement policies.
    ///
    /// # Errors
    ///
    /// Same as [`with_backing`](Self::with_backing).
    pub fn with_policies(
        config: &Config,
        mem: B,
        l1_policy: Box<dyn ReplacementPolicy>,
        l2_policy: Box<dyn ReplacementPolicy>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::build(config, mem, Some((l1_policy, l2_policy)))
    }

    /// Assembles an already validated configuration. Random policies are
    /// seeded here when none are supplied.
    fn build(
        config: &Config,
        mem: B,
        policies: Option<(Box<dyn ReplacementPolicy>, Box<dyn ReplacementPolicy>)>,
    ) -> Result<Self, ConfigError> {
        let mem_size = config.memory_size();
        if mem.size() < mem_size {
            return Err(ConfigError::BackingStoreSize {
                expected: mem_size,
                actual: mem.size(),
            });
        }

        let (l1_policy, l2_policy) = policies.unwrap_or_else(|| {
            let seed = config.general.seed.unwrap_or_else(entropy_seed);
            (
                Box::new(RandomPolicy::new(config.cache.l1.ways, seed)) as Box<dyn ReplacementPolicy>,
                Box::new(RandomPolicy::new(config.cache.l2.ways, seed ^ L2_SEED_SALT)),
            )
        });

        let bits = config.memory.addr_bits;
        let burst_len = config.memory.burst_len;
        let l1 = &config.cache.l1;
        let l2 = &config.cache.l2;
        info!(
            mem_size,
            burst_len,
            l1_sets = l1.num_sets(),
            l1_ways = l1.ways,
            l1_line = l1.line_bytes(),
            l2_sets = l2.num_sets(),
            l2_ways = l2.ways,
            l2_line = l2.line_bytes(),
            "building cache hierarchy"
        );

        Ok(Self {
            l1: L1Cache::new(l1.geometry(bits), l1.ways, burst_len, l1_policy),
            l2: L2Cache::new(l2.geometry(bits), l2.ways, burst_len, l2_policy),
            mem,
            burst_len,
            mem_size,
            burst_splits: 0,
        })
    }

    /// Invalidates every line of both levels and clears every dirty bit.
    ///
    /// Dirty L2 data is discarded, not written back; call [`flush`](Self::flush)
    /// first to keep it.
    pub fn init_caches(&mut self) {
        self.l1.invalidate_all();
        self.l2.invalidate_all();
        info!("caches invalidated");
    }

    /// Loads `len` bytes at `addr`, zero-extended and little-endian.
    ///
    /// The access may be misaligned and may cross one burst boundary.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not 1, 2 or 4, or if any byte of the access lies
    /// outside physical memory.
    pub fn read(&mut self, addr: u64, len: usize) -> u32 {
        let addr = self.check_access(addr, len);
        let Self { l1, l2, mem, burst_len, .. } = self;
        split_read(addr, len, *burst_len, |burst, buf| {
            l1.read_burst(burst, buf, l2, mem);
        })
    }

    /// Stores the `len` low-order bytes of `value` at `addr`, little-endian.
    ///
    /// # Panics
    ///
    /// Same conditions as [`read`](Self::read).
    pub fn write(&mut self, addr: u64, len: usize, value: u32) {
        let addr = self.check_access(addr, len);
        let Self { l1, l2, mem, burst_len, .. } = self;
        split_write(addr, len, value, *burst_len, |burst, data, mask| {
            l1.write_burst(burst, data, mask, l2, mem);
        });
    }

    fn check_access(&mut self, addr: u64, len: usize) -> PhysAddr {
        assert!(
            ACCESS_WIDTHS.contains(&len),
            "unsupported access width {len} at {addr:#x}"
        );
        let addr = PhysAddr::new(addr);
        check_phys_addr(addr, self.mem_size);
        if crosses_burst(addr, len, self.burst_len) {
            self.burst_splits += 1;
        }
        addr
    }

    /// Reports whether `addr` has a valid line in L1 and, if so, its
    /// position, tag and up to `len` bytes of content. Cache state is not
    /// touched.
    pub fn probe_l1(&self, addr: u64, len: usize) -> Option<LineProbe> {
        self.l1.probe(PhysAddr::new(addr), len)
    }

    /// Same as [`probe_l1`](Self::probe_l1) for the L2, including its dirty bit.
    pub fn probe_l2(&self, addr: u64, len: usize) -> Option<LineProbe> {
        self.l2.probe(PhysAddr::new(addr), len)
    }

    /// Writes every dirty L2 line back to the backing store.
    ///
    /// Afterwards the backing store matches what `read` would return for
    /// every address. Lines remain valid and become clean.
    ///
    /// # Returns
    ///
    /// The number of lines written back.
    pub fn flush(&mut self) -> usize {
        let written = self.l2.flush(&mut self.mem);
        info!(lines = written, "flushed dirty L2 lines");
        written
    }

    /// Snapshot of the access counters.
    pub fn stats(&self) -> HierarchyStats {
        HierarchyStats {
            l1: *self.l1.stats(),
            l2: *self.l2.stats(),
            burst_splits: self.burst_splits,
        }
    }

    /// Clears the access counters of both levels.
    pub fn reset_stats(&mut self) {
        self.l1.reset_stats();
        self.l2.reset_stats();
        self.burst_splits = 0;
    }

    /// The backing store, for uncached inspection.
    pub const fn backing(&self) -> &B {
        &self.mem
    }

    /// Mutable backing store, for loading images before simulation.
    ///
    /// Writes made here bypass the caches; lines already cached keep their
    /// old content.
    pub const fn backing_mut(&mut self) -> &mut B {
        &mut self.mem
    }

    /// The first-level cache.
    pub const fn l1(&self) -> &L1Cache {
        &self.l1
    }

    /// The second-level cache.
    pub const fn l2(&self) -> &L2Cache {
        &self.l2
    }

    /// Size of the physical address space in bytes.
    pub const fn memory_size(&self) -> u64 {
        self.mem_size
    }

    /// Burst length in bytes.
    pub const fn burst_len(&self) -> usize {
        self.burst_len
    }
}
