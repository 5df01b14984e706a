//! Functional units.
//!
//! This module contains the cache levels with their replacement policy and
//! the load/store pieces that feed them.

/// Cache hierarchy implementation (L1, L2) with address decomposition and replacement.
pub mod cache;

/// Load/Store Unit: burst-crossing assembly and masked copy.
pub mod lsu;
