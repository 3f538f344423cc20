//! Compile-time configuration: page geometry and the size-class mapping.

use crate::page::PageHeader;

/// Bytes in one page. A power of two; every page base is aligned to it,
/// which is what makes the pointer-to-page mask in `free` work.
pub const PAGE_SIZE: usize = 8192;

/// Block-size step and minimum block size in bytes. At least a pointer
/// wide, so a free block can hold its successor link in its first word.
pub const BLOCK_GRANULE: usize = 8;

/// Number of size classes served by the bucket table. Class `i` serves
/// requests of up to `(i + 1) * BLOCK_GRANULE` bytes.
pub const BUCKETS: usize = 1024;

/// In-band header footprint at the base of every page.
pub const HEADER_SIZE: usize = core::mem::size_of::<PageHeader>();

/// Largest satisfiable request: one page's arena. Anything bigger is
/// rejected rather than spanned across pages.
pub const MAX_USER_BYTES: usize = PAGE_SIZE - HEADER_SIZE;

/// Maps a request to the smallest class whose block size holds it.
///
/// Returns `None` for zero-byte requests and for requests beyond the
/// supported classes.
#[inline]
pub(crate) const fn bucket_index(bytes: usize) -> Option<usize> {
    if bytes == 0 {
        return None;
    }
    let index = bytes.div_ceil(BLOCK_GRANULE) - 1;
    if index >= BUCKETS {
        return None;
    }
    Some(index)
}

/// Block size served by bucket `index`.
#[inline]
pub(crate) const fn block_size_for(index: usize) -> usize {
    (index + 1) * BLOCK_GRANULE
}

/// Inverse of [`block_size_for`] for a known-valid block size.
#[inline]
pub(crate) const fn bucket_of_block_size(block_size: usize) -> usize {
    block_size / BLOCK_GRANULE - 1
}
