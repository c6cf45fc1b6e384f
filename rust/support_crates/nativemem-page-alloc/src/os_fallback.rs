//! Page allocation emulated on top of the global allocator.

use std::alloc::{Layout, alloc_zeroed, dealloc};

use crate::round_to_pages;

pub fn map_large(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    alloc_pages(size, large_page_size())
}

/// # Safety
///
/// `ptr` and `capacity` must come from one [`map_large`] call.
pub unsafe fn unmap_large(ptr: *mut std::ffi::c_void, capacity: usize) -> std::io::Result<()> {
    unsafe { free_pages(ptr, capacity, large_page_size()) }
}

pub fn enable_large_pages() -> std::io::Result<()> {
    Ok(())
}

pub fn map(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    alloc_pages(size, page_size())
}

/// # Safety
///
/// `ptr` and `capacity` must come from one [`map`] call.
pub unsafe fn unmap(ptr: *mut std::ffi::c_void, capacity: usize) -> std::io::Result<()> {
    unsafe { free_pages(ptr, capacity, page_size()) }
}

pub fn large_page_size() -> usize {
    2 * 1024 * 1024
}

pub fn page_size() -> usize {
    4 * 1024
}

fn page_layout(capacity: usize, page_size: usize) -> std::io::Result<Layout> {
    Layout::from_size_align(capacity, page_size)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid page layout"))
}

fn alloc_pages(size: usize, page_size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    let capacity = round_to_pages(size, page_size);
    let layout = page_layout(capacity, page_size)?;
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::OutOfMemory,
            "failed to allocate pages",
        ));
    }
    Ok((ptr.cast(), capacity))
}

unsafe fn free_pages(
    ptr: *mut std::ffi::c_void,
    capacity: usize,
    page_size: usize,
) -> std::io::Result<()> {
    assert!(capacity.is_multiple_of(page_size));
    let layout = page_layout(capacity, page_size)?;
    unsafe { dealloc(ptr.cast(), layout) };
    Ok(())
}
