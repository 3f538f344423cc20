//! Cumulative allocation counters.

use serde::{Deserialize, Serialize};

/// A snapshot of the allocator's cumulative counters.
///
/// Counters only ever grow; `blocks_allocated - blocks_freed` is the
/// number of blocks currently live across all pages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinStats {
    /// Pages acquired from the source since creation.
    pub pages_created: usize,
    /// Successful allocations.
    pub blocks_allocated: usize,
    /// Blocks returned by `free`.
    pub blocks_freed: usize,
    /// Requests refused, whether invalid or failed at the source.
    pub failed_requests: usize,
}

impl BinStats {
    #[inline]
    pub(crate) fn on_page(&mut self) {
        self.pages_created += 1;
    }

    #[inline]
    pub(crate) fn on_alloc(&mut self) {
        self.blocks_allocated += 1;
    }

    #[inline]
    pub(crate) fn on_free(&mut self) {
        self.blocks_freed += 1;
    }

    #[inline]
    pub(crate) fn on_reject(&mut self) {
        self.failed_requests += 1;
    }

    /// Number of blocks currently live.
    pub fn live_blocks(&self) -> usize {
        self.blocks_allocated - self.blocks_freed
    }
}
