//! Cache hierarchy core.
//!
//! This module contains the functional units (caches, load/store assembly)
//! and the hierarchy that wires them to a backing store.

/// Two-level hierarchy: public load/store, init, probe and flush surface.
pub mod hierarchy;

/// Functional units (cache levels, replacement, load/store assembly).
pub mod units;

pub use self::hierarchy::MemoryHierarchy;
