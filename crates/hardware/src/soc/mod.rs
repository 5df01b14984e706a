//! System-on-Chip (SoC) Components.
//!
//! This module organizes what sits below the cache hierarchy: the backing
//! store trait and the DRAM that implements it.

/// Backing store implementation (DRAM buffer and memory).
pub mod memory;

/// Backing store trait definition.
pub mod traits;

pub use memory::Memory;
pub use traits::BackingStore;
