//! Two-level cache hierarchy model for instruction-set simulators.
//!
//! This crate models the memory path a simulated CPU's loads and stores take:
//! 1. **Assembler:** Misaligned 1/2/4-byte accesses split into burst-aligned operations.
//! 2. **L1:** Small, highly associative, write-through, no-write-allocate.
//! 3. **L2:** Larger, write-back, write-allocate, the only holder of dirty data.
//! 4. **Backing store:** Flat DRAM under both levels, behind the `BackingStore` trait.
//! 5. **Support:** Configuration, statistics, and debug probes.
//!
//! ```
//! use memsim_core::{Config, MemoryHierarchy};
//!
//! let mut config = Config::default();
//! config.general.seed = Some(1);
//! let mut mem = MemoryHierarchy::new(&config).unwrap();
//! mem.init_caches();
//! mem.write(0x1000, 4, 0xCAFE_BABE);
//! assert_eq!(mem.read(0x1000, 4), 0xCAFE_BABE);
//! assert!(mem.probe_l1(0x1000, 4).is_some());
//! ```

/// Common types and constants (addresses, burst unit, errors).
pub mod common;
/// Hierarchy configuration (defaults, geometry, validation).
pub mod config;
/// Cache levels, load/store assembly, and the hierarchy facade.
pub mod core;
/// Backing store (trait and DRAM implementation).
pub mod soc;
/// Hit/miss/eviction statistics and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// Main hierarchy type; owns both caches and the backing store.
pub use crate::core::MemoryHierarchy;
/// Default backing store.
pub use crate::soc::Memory;
