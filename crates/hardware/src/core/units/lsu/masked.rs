//! Masked byte copy.
//!
//! A store narrower than a burst is carried as a full burst of data plus a
//! parallel byte mask; only positions whose mask entry is set are written.

/// Copies `src[i]` into `dst[i]` wherever `mask[i]` is set.
///
/// All three slices must have the same length.
///
/// # Examples
///
/// ```
/// use memsim_core::core::units::lsu::masked::masked_copy;
///
/// let mut dst = [0xAA; 4];
/// masked_copy(&mut dst, &[1, 2, 3, 4], &[false, true, true, false]);
/// assert_eq!(dst, [0xAA, 2, 3, 0xAA]);
/// ```
#[inline]
pub fn masked_copy(dst: &mut [u8], src: &[u8], mask: &[bool]) {
    debug_assert_eq!(dst.len(), src.len());
    debug_assert_eq!(dst.len(), mask.len());
    for ((d, &s), &m) in dst.iter_mut().zip(src).zip(mask) {
        if m {
            *d = s;
        }
    }
}
