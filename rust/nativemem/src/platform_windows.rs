use windows_sys::Win32::{Foundation::GetLastError, System::LibraryLoader::GetModuleHandleW};

/// Module handle (HINSTANCE) of the executable that created the process.
pub fn library_handle() -> Option<usize> {
    let handle = unsafe { GetModuleHandleW(std::ptr::null()) };
    if handle.is_null() {
        log::warn!("GetModuleHandleW(NULL) failed: error {}", unsafe {
            GetLastError()
        });
        return None;
    }
    Some(handle as usize)
}
