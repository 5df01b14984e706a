//! Global constants.
//!
//! This module defines the fixed quantities the hierarchy is built around:
//! 1. **Burst Unit:** Default elementary bus transfer size.
//! 2. **Access Widths:** The byte lengths accepted by the load/store surface.

/// Default number of bytes moved by one elementary bus operation.
pub const BURST_LEN: usize = 8;

/// Widest access the load/store surface accepts, in bytes.
pub const MAX_ACCESS_BYTES: usize = 4;

/// Access widths accepted by `read` and `write`.
pub const ACCESS_WIDTHS: [usize; 3] = [1, 2, 4];
