//! The allocator: a bucket table of partial pages plus a full-page list.
//!
//! Each size class owns a doubly-linked bucket list of pages that still
//! have at least one free block; the head is always the page allocations
//! are served from. A page whose last block is handed out leaves its
//! bucket for the global full-page list, and returns to the bucket head
//! the moment one of its blocks is freed. Both transitions are O(1).

use core::fmt;
use core::ptr::NonNull;
use std::io::{self, Write};

use crate::config::{block_size_for, bucket_index, bucket_of_block_size, BUCKETS, MAX_USER_BYTES, PAGE_SIZE};
use crate::page::PageHeader;
use crate::source::{PageSource, SystemPageSource};
use crate::stats::BinStats;

/// The error type for failed allocation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The request was zero bytes or larger than
    /// [`MAX_USER_BYTES`](crate::MAX_USER_BYTES).
    InvalidRequest,
    /// The page source could not supply a new page.
    Exhausted,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::InvalidRequest => f.write_str("invalid allocation request"),
            AllocError::Exhausted => f.write_str("page source exhausted"),
        }
    }
}

impl std::error::Error for AllocError {}

/// A fixed-block-size page allocator.
///
/// Requests are rounded up to a multiple of
/// [`BLOCK_GRANULE`](crate::BLOCK_GRANULE) and served from pages dedicated
/// to that block size. Freed blocks go back to their page's free list and
/// are handed out again before any never-used memory, so a freed address
/// may be returned by the very next same-size allocation.
///
/// Pages are acquired from the [`PageSource`] on demand and retained for
/// the allocator's whole lifetime; dropping the bin releases every page.
pub struct PageBin<S: PageSource = SystemPageSource> {
    buckets: Box<[Option<NonNull<PageHeader>>; BUCKETS]>,
    full: Option<NonNull<PageHeader>>,
    source: S,
    stats: BinStats,
}

// The bin exclusively owns every page it manages; moving it between
// threads moves the whole arena with it. It is deliberately not `Sync`.
unsafe impl<S: PageSource + Send> Send for PageBin<S> {}

impl PageBin<SystemPageSource> {
    /// Creates an allocator backed by the global system allocator.
    pub fn new() -> Self {
        Self::new_in(SystemPageSource)
    }
}

impl Default for PageBin<SystemPageSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PageSource> PageBin<S> {
    /// Creates an allocator backed by the given page source.
    pub fn new_in(source: S) -> Self {
        Self {
            buckets: Box::new([None; BUCKETS]),
            full: None,
            source,
            stats: BinStats::default(),
        }
    }

    /// Returns a pointer to at least `bytes` bytes of uninitialized
    /// storage inside some page's arena.
    ///
    /// # Errors
    /// [`AllocError::InvalidRequest`] for zero-byte requests or requests
    /// larger than [`MAX_USER_BYTES`](crate::MAX_USER_BYTES);
    /// [`AllocError::Exhausted`] when the page source fails. Page state is
    /// unchanged on error.
    pub fn allocate(&mut self, bytes: usize) -> Result<NonNull<u8>, AllocError> {
        if bytes > MAX_USER_BYTES {
            self.stats.on_reject();
            return Err(AllocError::InvalidRequest);
        }
        let Some(index) = bucket_index(bytes) else {
            self.stats.on_reject();
            return Err(AllocError::InvalidRequest);
        };

        let mut page = match self.buckets[index] {
            Some(head) => head,
            None => self.grow_bucket(index)?,
        };

        // The bucket head always has room. The free list is consulted
        // before the watermark inside `take_block`.
        let block = unsafe { page.as_mut().take_block() };
        if unsafe { page.as_ref().is_full() } {
            self.remove_bucket_head(index);
            self.push_full(page);
        }
        self.stats.on_alloc();
        Ok(block)
    }

    /// Returns the block at `ptr` to its owning page's free list.
    ///
    /// A null `ptr` is a no-op. The freed address becomes the first
    /// candidate for the next allocation of the same size class.
    ///
    /// # Safety
    /// `ptr` must be null or a pointer previously returned by
    /// [`allocate`](Self::allocate) on this bin and not freed since.
    /// Freeing a foreign pointer, an interior pointer, or the same pointer
    /// twice is undefined behavior and is not detected.
    pub unsafe fn free(&mut self, ptr: *mut u8) {
        let Some(block) = NonNull::new(ptr) else {
            return;
        };
        let mut page = PageHeader::from_block(block);

        if page.as_ref().is_full() {
            // The page sits on the full list; hand it back to its bucket
            // so the freed block is immediately allocatable again.
            let index = bucket_of_block_size(page.as_ref().block_size());
            self.remove_full(page);
            self.push_bucket_head(index, page);
        }

        page.as_mut().recycle_block(block);
        self.stats.on_free();
    }

    /// Returns the header of the page owning `ptr`, or `None` for null.
    ///
    /// # Safety
    /// `ptr` must be null or point into a block handed out by this bin
    /// (live or since freed).
    pub unsafe fn page_of(&self, ptr: *const u8) -> Option<&PageHeader> {
        let block = NonNull::new(ptr.cast_mut())?;
        Some(PageHeader::from_block(block).as_ref())
    }

    /// A snapshot of the cumulative allocation counters.
    pub fn stats(&self) -> BinStats {
        self.stats
    }

    /// Writes a human-readable dump of every page to `out`.
    ///
    /// Bucket lists print first, then the full-page list. Each traversal
    /// remembers its starting page and stops on revisit, so a corrupted
    /// cycle cannot hang the dump; the free-chain print is bounded by the
    /// page capacity for the same reason. Read-only.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for head in self.buckets.iter().flatten() {
            Self::dump_list(out, *head)?;
        }
        if let Some(head) = self.full {
            Self::dump_list(out, head)?;
        }
        Ok(())
    }

    /// Prints the dump to standard output.
    pub fn view(&self) {
        let stdout = io::stdout();
        let _ = self.dump(&mut stdout.lock());
    }

    fn dump_list<W: Write>(out: &mut W, head: NonNull<PageHeader>) -> io::Result<()> {
        let mut cur = Some(head);
        while let Some(page) = cur {
            let page = unsafe { page.as_ref() };
            write!(
                out,
                "Page at[{:p}] size[{}] max[{}] used[{}] watermark[{:p}] free[",
                core::ptr::from_ref(page),
                page.block_size(),
                page.max_blocks(),
                page.used(),
                page.watermark(),
            )?;
            for (i, block) in page.free_list().take(page.max_blocks()).enumerate() {
                if i > 0 {
                    write!(out, " ")?;
                }
                write!(out, "{:p}", block.as_ptr())?;
            }
            writeln!(out, "]")?;

            cur = page.next;
            if cur == Some(head) {
                break;
            }
        }
        Ok(())
    }

    /// Acquires a page for bucket `index` and installs it at the head.
    fn grow_bucket(&mut self, index: usize) -> Result<NonNull<PageHeader>, AllocError> {
        let block_size = block_size_for(index);
        let Some(base) = self.source.acquire() else {
            #[cfg(feature = "tracing")]
            tracing::debug!(block_size, "page source exhausted");
            self.stats.on_reject();
            return Err(AllocError::Exhausted);
        };
        // The pointer-to-page mask in `free` relies on this contract.
        debug_assert_eq!(base.as_ptr() as usize & (PAGE_SIZE - 1), 0);

        let page = unsafe { PageHeader::init(base, block_size) };
        self.push_bucket_head(index, page);
        self.stats.on_page();
        #[cfg(feature = "tracing")]
        tracing::trace!(bucket = index, block_size, "acquired fresh page");
        Ok(page)
    }

    fn push_bucket_head(&mut self, index: usize, mut page: NonNull<PageHeader>) {
        unsafe {
            let head = self.buckets[index];
            page.as_mut().next = head;
            page.as_mut().prev = None;
            if let Some(mut head) = head {
                head.as_mut().prev = Some(page);
            }
            self.buckets[index] = Some(page);
        }
    }

    /// Detaches the bucket head, the only position a page ever leaves a
    /// bucket from.
    fn remove_bucket_head(&mut self, index: usize) {
        unsafe {
            let Some(mut head) = self.buckets[index] else {
                debug_assert!(false, "bucket {index} has no head to remove");
                return;
            };
            let next = head.as_ref().next;
            if let Some(mut next) = next {
                next.as_mut().prev = None;
            }
            head.as_mut().next = None;
            head.as_mut().prev = None;
            self.buckets[index] = next;
        }
    }

    fn push_full(&mut self, mut page: NonNull<PageHeader>) {
        unsafe {
            page.as_mut().next = self.full;
            page.as_mut().prev = None;
            if let Some(mut head) = self.full {
                head.as_mut().prev = Some(page);
            }
            self.full = Some(page);
        }
    }

    /// Detaches `page` from anywhere in the full list.
    fn remove_full(&mut self, mut page: NonNull<PageHeader>) {
        unsafe {
            let next = page.as_ref().next;
            let prev = page.as_ref().prev;
            match prev {
                Some(mut prev) => prev.as_mut().next = next,
                None => self.full = next,
            }
            if let Some(mut next) = next {
                next.as_mut().prev = prev;
            }
            page.as_mut().next = None;
            page.as_mut().prev = None;
        }
    }
}

impl<S: PageSource> Drop for PageBin<S> {
    fn drop(&mut self) {
        unsafe {
            for slot in self.buckets.iter_mut() {
                let mut cur = slot.take();
                while let Some(page) = cur {
                    cur = page.as_ref().next;
                    self.source.release(page.cast());
                }
            }
            let mut cur = self.full.take();
            while let Some(page) = cur {
                cur = page.as_ref().next;
                self.source.release(page.cast());
            }
        }
    }
}
