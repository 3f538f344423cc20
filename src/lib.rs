//! # `pagebin` - fixed-block-size page allocator
//!
//! A small-object allocator that satisfies byte-sized requests by carving
//! aligned pages into uniformly-sized blocks, grouping pages by block size,
//! and recycling freed blocks through an intrusive per-page free list. It
//! trades the generality of a coalescing allocator for speed and locality:
//! every operation except the free-list length query is O(1).
//!
//! ## How it works
//!
//! - Requests are rounded up to a multiple of [`BLOCK_GRANULE`] and mapped
//!   to a size class; each class owns a bucket of pages dedicated to that
//!   block size.
//! - Every page is a [`PAGE_SIZE`]-aligned region with a [`PageHeader`]
//!   written into its first bytes. Fresh blocks are handed out from the top
//!   of the page downward (the watermark); recycled blocks are chained
//!   through their own first word and reused before any fresh block.
//! - Freeing masks the pointer with `!(PAGE_SIZE - 1)` to recover the
//!   owning page in constant time.
//! - Pages with no free block move to a global full-page list and return to
//!   their bucket's head the moment one of their blocks is freed.
//!
//! ## Example
//!
//! ```rust
//! use pagebin::PageBin;
//!
//! let mut bin = PageBin::new();
//! let block = bin.allocate(64).expect("fresh bin cannot be exhausted");
//!
//! unsafe {
//!     block.as_ptr().write_bytes(0xAB, 64);
//!     bin.free(block.as_ptr());
//! }
//!
//! // Freed blocks are recycled before any untouched memory.
//! let again = bin.allocate(64).unwrap();
//! assert_eq!(again, block);
//! ```
//!
//! The allocator is strictly single-threaded: all mutating operations take
//! `&mut self`, which is the whole synchronization story. A [`PageBin`] can
//! be moved to another thread, never shared between two.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod page;
pub mod source;
pub mod stats;

mod bin;

pub use bin::{AllocError, PageBin};
pub use config::{BLOCK_GRANULE, BUCKETS, HEADER_SIZE, MAX_USER_BYTES, PAGE_SIZE};
pub use page::PageHeader;
pub use source::{OsPageSource, PageSource, SystemPageSource};
pub use stats::BinStats;

/// Version of the linked `pagebin`, included at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Compile-time assertions for the page geometry.
const _: () = {
    use core::mem;

    assert!(PAGE_SIZE.is_power_of_two());
    assert!(BLOCK_GRANULE.is_power_of_two());

    // The intrusive free list stores a pointer in the first word of each
    // free block, so every block must be able to hold one.
    assert!(BLOCK_GRANULE >= mem::size_of::<usize>());

    // The in-band header must match its declared footprint and leave room
    // for at least one block of the largest class.
    assert!(mem::size_of::<PageHeader>() == HEADER_SIZE);
    assert!(HEADER_SIZE % BLOCK_GRANULE == 0);
    assert!(HEADER_SIZE < PAGE_SIZE);
    assert!(MAX_USER_BYTES >= BLOCK_GRANULE);
};
