//! Burst-crossing access assembly.
//!
//! Loads and stores of 1, 2 or 4 bytes may start anywhere, so one access can
//! straddle a burst boundary. This module turns such an access into one or
//! two burst-aligned operations over a working buffer twice the burst length:
//! the first burst always, the following burst only when
//! `offset + len > burst`.

use crate::common::PhysAddr;
use crate::common::constants::MAX_ACCESS_BYTES;

/// Checks whether an access of `len` bytes at `addr` spills into the next burst.
///
/// # Arguments
///
/// * `addr` - The byte address of the access.
/// * `len` - The access width in bytes.
/// * `burst` - Burst length in bytes (a power of two).
pub const fn crosses_burst(addr: PhysAddr, len: usize, burst: usize) -> bool {
    addr.offset_in(burst as u64) as usize + len > burst
}

/// Splits a load into burst reads and reassembles the result in
/// little-endian order.
///
/// # Arguments
///
/// * `addr` - The byte address of the access.
/// * `len` - The number of bytes to read (at most 4).
/// * `burst` - Burst length in bytes.
/// * `read_burst` - Reads one burst starting at the given burst-aligned address.
///
/// # Returns
///
/// The `len` bytes at `addr` zero-extended to 32 bits.
pub fn split_read<F>(addr: PhysAddr, len: usize, burst: usize, mut read_burst: F) -> u32
where
    F: FnMut(PhysAddr, &mut [u8]),
{
    debug_assert!(len <= MAX_ACCESS_BYTES);
    let base = addr.align_down(burst as u64);
    let offset = addr.offset_in(burst as u64) as usize;
    let mut buf = vec![0u8; 2 * burst];

    read_burst(base, &mut buf[..burst]);
    if crosses_burst(addr, len, burst) {
        read_burst(base.add(burst as u64), &mut buf[burst..]);
    }

    let mut bytes = [0u8; MAX_ACCESS_BYTES];
    bytes[..len].copy_from_slice(&buf[offset..offset + len]);
    u32::from_le_bytes(bytes)
}

/// Splits a store into masked burst writes.
///
/// Only the `len` low-order bytes of `val` are written; every other byte of
/// both bursts is masked off.
///
/// # Arguments
///
/// * `addr` - The byte address of the access.
/// * `len` - The number of bytes to write (at most 4).
/// * `val` - The value to store (little-endian).
/// * `burst` - Burst length in bytes.
/// * `write_burst` - Writes one burst at the given burst-aligned address,
///   receiving the burst data and its byte mask.
pub fn split_write<F>(addr: PhysAddr, len: usize, val: u32, burst: usize, mut write_burst: F)
where
    F: FnMut(PhysAddr, &[u8], &[bool]),
{
    debug_assert!(len <= MAX_ACCESS_BYTES);
    let base = addr.align_down(burst as u64);
    let offset = addr.offset_in(burst as u64) as usize;
    let mut data = vec![0u8; 2 * burst];
    let mut mask = vec![false; 2 * burst];

    data[offset..offset + len].copy_from_slice(&val.to_le_bytes()[..len]);
    mask[offset..offset + len].fill(true);

    write_burst(base, &data[..burst], &mask[..burst]);
    if crosses_burst(addr, len, burst) {
        write_burst(base.add(burst as u64), &data[burst..], &mask[burst..]);
    }
}
