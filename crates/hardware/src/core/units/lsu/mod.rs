//! Load/Store Unit (LSU).
//!
//! This module provides the pieces that sit between a load/store request and
//! the first-level cache. It includes:
//! - [`burst`]: Splitting a possibly misaligned access into burst-aligned operations.
//! - [`masked`]: Byte-wise conditional copy guarded by a mask.

/// Burst-crossing access assembly.
pub mod burst;

/// Masked byte copy.
pub mod masked;

pub use burst::{crosses_burst, split_read, split_write};
pub use masked::masked_copy;
