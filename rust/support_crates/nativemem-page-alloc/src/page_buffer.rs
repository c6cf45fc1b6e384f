//! Owned, page-aligned native memory.
//!
//! A `PageBuffer` is the backing store of direct buffers: its memory comes straight from
//! the OS (anonymous `mmap` on Linux, `VirtualAlloc` on Windows), is zeroed on allocation,
//! and keeps the same address until the buffer is dropped.

use std::sync::OnceLock;

use crate::os;

/// Kind of pages backing a [`PageBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Regular OS pages (typically 4KB).
    Regular,
    /// Large (huge) pages, typically 2MB.
    Large,
}

impl PageKind {
    /// Page size, and therefore base alignment, for this kind on the current host.
    pub fn page_size(self) -> usize {
        match self {
            PageKind::Regular => os::page_size(),
            PageKind::Large => os::large_page_size(),
        }
    }
}

/// A block of OS pages owned by this value.
pub struct PageBuffer {
    ptr: *mut u8,
    /// Requested size in bytes.
    len: usize,
    /// Mapped size in bytes, a whole number of pages.
    capacity: usize,
    kind: PageKind,
}

impl PageBuffer {
    /// Allocates `size` bytes of regular pages.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mapping fails.
    pub fn allocate_regular(size: usize) -> std::io::Result<PageBuffer> {
        let (ptr, capacity) = os::map(size)?;
        log::debug!("mapped {capacity} bytes of regular pages at {ptr:p} for {size} bytes");
        Ok(PageBuffer::from_raw_parts(ptr, size, capacity, PageKind::Regular))
    }

    /// Allocates `size` bytes of large pages.
    ///
    /// # Errors
    ///
    /// Fails when large pages cannot be enabled on this host or when there is not
    /// enough contiguous physical memory for them.
    pub fn allocate_large(size: usize) -> std::io::Result<PageBuffer> {
        check_large_page_support()?;
        let (ptr, capacity) = os::map_large(size)?;
        log::debug!("mapped {capacity} bytes of large pages at {ptr:p} for {size} bytes");
        Ok(PageBuffer::from_raw_parts(ptr, size, capacity, PageKind::Large))
    }

    /// Tries large pages first and falls back to regular pages.
    pub fn allocate_with_fallback(size: usize) -> std::io::Result<PageBuffer> {
        match Self::allocate_large(size) {
            Ok(buf) => Ok(buf),
            Err(e) => {
                log::warn!("large page allocation of {size} bytes failed ({e}), using regular pages");
                Self::allocate_regular(size)
            }
        }
    }

    /// Allocates `size` bytes of the given page kind.
    pub fn allocate(size: usize, kind: PageKind) -> std::io::Result<PageBuffer> {
        match kind {
            PageKind::Regular => Self::allocate_regular(size),
            PageKind::Large => Self::allocate_large(size),
        }
    }

    fn from_raw_parts(
        ptr: *mut std::ffi::c_void,
        len: usize,
        capacity: usize,
        kind: PageKind,
    ) -> PageBuffer {
        assert!((ptr as usize).is_multiple_of(kind.page_size()));
        PageBuffer {
            ptr: ptr.cast(),
            len,
            capacity,
            kind,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mapped size in bytes; at least `len()` and a multiple of the page size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn kind(&self) -> PageKind {
        self.kind
    }

    /// Base alignment, equal to the page size of [`Self::kind`].
    #[inline]
    pub fn alignment(&self) -> usize {
        self.kind.page_size()
    }

    /// Address of the first byte. Never null, valid until `self` is dropped.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    /// Mutable address of the first byte. Never null, valid until `self` is dropped.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }

    /// Reinterprets the bytes as a slice of `T` in host order.
    ///
    /// Trailing bytes that do not form a whole `T` are left out.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[inline]
    pub fn as_slice<T>(&self) -> &[T]
    where
        T: bytemuck::AnyBitPattern,
    {
        let len = whole_elements::<T>(self.len);
        bytemuck::cast_slice(&self.as_bytes()[..len])
    }

    /// Mutable counterpart of [`Self::as_slice`].
    #[inline]
    pub fn as_mut_slice<T>(&mut self) -> &mut [T]
    where
        T: bytemuck::AnyBitPattern + bytemuck::NoUninit,
    {
        let len = whole_elements::<T>(self.len);
        bytemuck::cast_slice_mut(&mut self.as_bytes_mut()[..len])
    }
}

/// Byte length of the longest prefix of `len` bytes made of whole `T` elements.
#[inline]
fn whole_elements<T>(len: usize) -> usize {
    let size = std::mem::size_of::<T>();
    assert!(size != 0, "zero-sized element type");
    len - len % size
}

impl std::ops::Deref for PageBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl std::ops::DerefMut for PageBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_bytes_mut()
    }
}

impl AsRef<[u8]> for PageBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Drop for PageBuffer {
    fn drop(&mut self) {
        let res = match self.kind {
            PageKind::Regular => unsafe { os::unmap(self.ptr.cast(), self.capacity) },
            PageKind::Large => unsafe { os::unmap_large(self.ptr.cast(), self.capacity) },
        };
        if let Err(e) = res {
            log::error!("failed to release {} bytes at {:p}: {e}", self.capacity, self.ptr);
        }
    }
}

// SAFETY: the buffer exclusively owns its pages and releases them on drop.
unsafe impl Send for PageBuffer {}

// SAFETY: shared access only hands out `&[u8]`; mutation requires `&mut self`.
unsafe impl Sync for PageBuffer {}

impl std::fmt::Debug for PageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Checks once per process whether large pages can be mapped, enabling them if needed.
pub fn check_large_page_support() -> std::io::Result<()> {
    static RESULT: OnceLock<Result<(), (std::io::ErrorKind, String)>> = OnceLock::new();
    RESULT
        .get_or_init(|| probe_large_pages().map_err(|e| (e.kind(), e.to_string())))
        .clone()
        .map_err(|(kind, message)| std::io::Error::new(kind, message))
}

fn probe_large_pages() -> std::io::Result<()> {
    if try_map_large_page().is_ok() {
        return Ok(());
    }
    os::enable_large_pages()?;
    try_map_large_page()
}

fn try_map_large_page() -> std::io::Result<()> {
    let (ptr, capacity) = os::map_large(1)?;
    unsafe { os::unmap_large(ptr, capacity) }
}
