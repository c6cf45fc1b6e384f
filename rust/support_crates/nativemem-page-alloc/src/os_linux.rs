//! Page allocation over anonymous private `mmap` regions.

use std::sync::OnceLock;

use crate::round_to_pages;

/// Maps `size` bytes (rounded up to whole huge pages) with `MAP_HUGETLB`.
///
/// Succeeds only when huge pages are configured on the host, e.g. through
/// `/proc/sys/vm/nr_hugepages` or `/proc/sys/vm/nr_overcommit_hugepages`.
/// Returns the mapping and its actual capacity; release it with [`unmap_large`].
pub fn map_large(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    map_anonymous(
        round_to_pages(size, large_page_size()),
        libc::MAP_HUGETLB,
    )
}

/// Releases a mapping obtained from [`map_large`].
///
/// # Safety
///
/// `ptr` and `capacity` must come from one [`map_large`] call, and the mapping must not
/// be used afterwards.
pub unsafe fn unmap_large(ptr: *mut std::ffi::c_void, capacity: usize) -> std::io::Result<()> {
    unsafe { unmap(ptr, capacity) }
}

/// Nothing to do here: huge pages are provisioned by the administrator.
pub fn enable_large_pages() -> std::io::Result<()> {
    Ok(())
}

/// Maps `size` bytes (rounded up to whole regular pages). The memory is zeroed.
pub fn map(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    map_anonymous(round_to_pages(size, page_size()), 0)
}

/// Releases a mapping obtained from [`map`].
///
/// # Safety
///
/// `ptr` and `capacity` must come from one [`map`] call, and the mapping must not be
/// used afterwards.
pub unsafe fn unmap(ptr: *mut std::ffi::c_void, capacity: usize) -> std::io::Result<()> {
    let res = unsafe { libc::munmap(ptr, capacity) };
    if res < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

fn map_anonymous(
    capacity: usize,
    extra_flags: libc::c_int,
) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            capacity,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | extra_flags,
            -1,
            0,
        )
    };
    if ptr.is_null() || ptr == libc::MAP_FAILED {
        return Err(std::io::Error::last_os_error());
    }
    Ok((ptr, capacity))
}

/// Huge page size as reported by `/proc/meminfo`, 2MB if it cannot be determined.
pub fn large_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| read_huge_page_size().unwrap_or(2 * 1024 * 1024))
}

/// Regular page size from `sysconf(_SC_PAGESIZE)`, 4KB if the call fails.
pub fn page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| {
        let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if res > 0 { res as usize } else { 4 * 1024 }
    })
}

/// Parses the `Hugepagesize:    2048 kB` line.
fn read_huge_page_size() -> Option<usize> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    let line = meminfo
        .lines()
        .find(|line| line.starts_with("Hugepagesize:"))?;
    let size_kb = line.split_whitespace().nth(1)?.parse::<usize>().ok()?;
    Some(size_kb * 1024)
}
