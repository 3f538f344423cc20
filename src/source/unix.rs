#![cfg(unix)]

use core::ptr::{self, NonNull};

use libc::{c_void, free, posix_memalign};

use crate::config::PAGE_SIZE;
use crate::source::PageSource;

/// A page source over the platform's aligned-allocation entry point
/// (`posix_memalign`).
#[derive(Default, Clone, Copy, Debug)]
pub struct OsPageSource;

impl PageSource for OsPageSource {
    fn acquire(&mut self) -> Option<NonNull<u8>> {
        let mut raw: *mut c_void = ptr::null_mut();
        let rc = unsafe { posix_memalign(&mut raw, PAGE_SIZE, PAGE_SIZE) };
        if rc != 0 {
            return None;
        }
        let page = NonNull::new(raw.cast::<u8>())?;
        // posix_memalign leaves the region uninitialized; the page
        // contract promises zeroed memory.
        unsafe { ptr::write_bytes(page.as_ptr(), 0, PAGE_SIZE) };
        Some(page)
    }

    unsafe fn release(&mut self, page: NonNull<u8>) {
        free(page.as_ptr().cast::<c_void>());
    }
}
