//! Page allocation through `VirtualAlloc`.

use std::sync::OnceLock;

use windows_sys::Win32::{
    Foundation::{CloseHandle, ERROR_SUCCESS, GetLastError, HANDLE, LUID},
    Security::{
        AdjustTokenPrivileges, LUID_AND_ATTRIBUTES, LookupPrivilegeValueW, SE_LOCK_MEMORY_NAME,
        SE_PRIVILEGE_ENABLED, TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES, TOKEN_QUERY,
    },
    System::{
        Memory::{
            GetLargePageMinimum, MEM_COMMIT, MEM_LARGE_PAGES, MEM_RELEASE, MEM_RESERVE,
            PAGE_READWRITE, VirtualAlloc, VirtualFree,
        },
        SystemInformation::{GetSystemInfo, SYSTEM_INFO},
        Threading::{GetCurrentProcess, OpenProcessToken},
    },
};

use crate::round_to_pages;

/// Commits `size` bytes (rounded up to whole large pages) with `MEM_LARGE_PAGES`.
///
/// Requires the "Lock pages in memory" user right, see [`enable_large_pages`].
pub fn map_large(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    virtual_alloc(
        round_to_pages(size, large_page_size()),
        MEM_COMMIT | MEM_RESERVE | MEM_LARGE_PAGES,
    )
}

/// # Safety
///
/// `ptr` must come from [`map_large`] and must not be used afterwards.
pub unsafe fn unmap_large(ptr: *mut std::ffi::c_void, capacity: usize) -> std::io::Result<()> {
    assert!(capacity.is_multiple_of(large_page_size()));
    unsafe { virtual_free(ptr) }
}

/// Enables `SeLockMemoryPrivilege` on the process token.
pub fn enable_large_pages() -> std::io::Result<()> {
    unsafe {
        let mut token: HANDLE = std::ptr::null_mut();
        if OpenProcessToken(
            GetCurrentProcess(),
            TOKEN_ADJUST_PRIVILEGES | TOKEN_QUERY,
            &mut token,
        ) == 0
        {
            return Err(last_error());
        }

        let mut luid = LUID {
            LowPart: 0,
            HighPart: 0,
        };
        if LookupPrivilegeValueW(std::ptr::null(), SE_LOCK_MEMORY_NAME, &mut luid) == 0 {
            let err = last_error();
            CloseHandle(token);
            return Err(err);
        }

        let privileges = TOKEN_PRIVILEGES {
            PrivilegeCount: 1,
            Privileges: [LUID_AND_ATTRIBUTES {
                Luid: luid,
                Attributes: SE_PRIVILEGE_ENABLED,
            }],
        };
        let adjusted = AdjustTokenPrivileges(
            token,
            0,
            &privileges,
            0,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        );
        // AdjustTokenPrivileges reports partial success through GetLastError.
        let status = GetLastError();
        CloseHandle(token);

        if adjusted == 0 || status != ERROR_SUCCESS {
            return Err(std::io::Error::from_raw_os_error(status as i32));
        }
        Ok(())
    }
}

/// Commits `size` bytes (rounded up to whole regular pages). The memory is zeroed.
pub fn map(size: usize) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    virtual_alloc(round_to_pages(size, page_size()), MEM_COMMIT | MEM_RESERVE)
}

/// # Safety
///
/// `ptr` must come from [`map`] and must not be used afterwards.
pub unsafe fn unmap(ptr: *mut std::ffi::c_void, capacity: usize) -> std::io::Result<()> {
    assert!(capacity.is_multiple_of(page_size()));
    unsafe { virtual_free(ptr) }
}

pub fn large_page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| match unsafe { GetLargePageMinimum() } {
        0 => 2 * 1024 * 1024,
        size => size,
    })
}

pub fn page_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| unsafe {
        let mut info: SYSTEM_INFO = std::mem::zeroed();
        GetSystemInfo(&mut info);
        info.dwPageSize as usize
    })
}

fn virtual_alloc(
    capacity: usize,
    flags: u32,
) -> std::io::Result<(*mut std::ffi::c_void, usize)> {
    let ptr = unsafe { VirtualAlloc(std::ptr::null_mut(), capacity, flags, PAGE_READWRITE) };
    if ptr.is_null() {
        return Err(last_error());
    }
    Ok((ptr, capacity))
}

unsafe fn virtual_free(ptr: *mut std::ffi::c_void) -> std::io::Result<()> {
    if unsafe { VirtualFree(ptr, 0, MEM_RELEASE) } == 0 {
        return Err(last_error());
    }
    Ok(())
}

fn last_error() -> std::io::Error {
    std::io::Error::from_raw_os_error(unsafe { GetLastError() } as i32)
}
