/// Handle of the main program, as returned by `dlopen(NULL)`.
///
/// The handle is never closed: it stays valid for the life of the process.
pub fn library_handle() -> Option<usize> {
    let handle = unsafe { libc::dlopen(std::ptr::null(), libc::RTLD_LAZY) };
    if handle.is_null() {
        let reason = unsafe { libc::dlerror() };
        let reason = if reason.is_null() {
            String::from("unknown error")
        } else {
            unsafe { std::ffi::CStr::from_ptr(reason) }
                .to_string_lossy()
                .into_owned()
        };
        log::warn!("dlopen(NULL) failed: {reason}");
        return None;
    }
    Some(handle as usize)
}
