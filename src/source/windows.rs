#![cfg(windows)]

use core::ffi::c_void;
use core::ptr::{self, NonNull};

use windows_sys::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE,
};

use crate::config::PAGE_SIZE;
use crate::source::PageSource;

/// A page source over the platform's aligned-allocation entry point
/// (`VirtualAlloc`).
///
/// Reservations come back on allocation-granularity boundaries (64 KiB),
/// which satisfies the `PAGE_SIZE` alignment contract, and committed
/// pages arrive zero-filled.
#[derive(Default, Clone, Copy, Debug)]
pub struct OsPageSource;

impl PageSource for OsPageSource {
    fn acquire(&mut self) -> Option<NonNull<u8>> {
        let raw = unsafe {
            VirtualAlloc(ptr::null(), PAGE_SIZE, MEM_COMMIT | MEM_RESERVE, PAGE_READWRITE)
        };
        NonNull::new(raw.cast::<u8>())
    }

    unsafe fn release(&mut self, page: NonNull<u8>) {
        VirtualFree(page.as_ptr().cast::<c_void>(), 0, MEM_RELEASE);
    }
}
