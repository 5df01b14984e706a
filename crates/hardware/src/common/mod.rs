//! Common types and utilities shared by the cache hierarchy.
//!
//! This module provides the building blocks used by every level. It includes:
//! 1. **Address Types:** A strong type for physical addresses.
//! 2. **Constants:** Burst-unit geometry and accepted access widths.
//! 3. **Error Handling:** Configuration errors and the fatal address check.

/// Physical address type.
pub mod addr;

/// Burst-unit and access-width constants.
pub mod constants;

/// Configuration errors and the fatal out-of-range address check.
pub mod error;

pub use addr::PhysAddr;
pub use constants::BURST_LEN;
pub use error::{ConfigError, check_phys_addr};
