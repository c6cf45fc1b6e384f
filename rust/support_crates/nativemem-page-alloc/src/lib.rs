//! OS page-backed native memory for the nativemem crates.
//!
//! Memory handed out here lives outside the Rust allocator, so its address is stable
//! for the lifetime of the owning [`page_buffer::PageBuffer`].

pub mod page_buffer;

#[cfg_attr(target_os = "linux", path = "os_linux.rs")]
#[cfg_attr(windows, path = "os_windows.rs")]
#[cfg_attr(not(any(target_os = "linux", windows)), path = "os_fallback.rs")]
pub mod os;

pub use page_buffer::{PageBuffer, PageKind};

/// Rounds `size` up to a whole number of pages; zero sizes still take one page.
#[inline]
pub(crate) fn round_to_pages(size: usize, page_size: usize) -> usize {
    debug_assert!(page_size.is_power_of_two());
    (size.max(1) + page_size - 1) & !(page_size - 1)
}
