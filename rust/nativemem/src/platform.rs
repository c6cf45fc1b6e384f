//! Facts about the platform the process runs on.

use std::{num::NonZeroUsize, sync::OnceLock};

use crate::{order::ByteOrder, platform_sys};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    Linux,
    Windows,
    MacOs,
    Other,
}

impl PlatformFamily {
    fn current() -> PlatformFamily {
        if cfg!(target_os = "linux") {
            PlatformFamily::Linux
        } else if cfg!(windows) {
            PlatformFamily::Windows
        } else if cfg!(target_os = "macos") {
            PlatformFamily::MacOs
        } else {
            PlatformFamily::Other
        }
    }
}

/// Opaque, non-zero handle of the platform's loaded program module.
///
/// On Windows this is the HINSTANCE of the executable, on Unix the `dlopen(NULL)`
/// handle of the main program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibraryHandle(NonZeroUsize);

impl LibraryHandle {
    #[inline]
    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// Probed platform capabilities.
#[derive(Debug)]
pub struct Platform {
    family: PlatformFamily,
    pointer_width: u32,
    library: Option<LibraryHandle>,
}

impl Platform {
    /// Process-wide platform description, probed on first use.
    pub fn current() -> &'static Platform {
        static PLATFORM: OnceLock<Platform> = OnceLock::new();
        PLATFORM.get_or_init(Platform::probe)
    }

    fn probe() -> Platform {
        let platform = Platform {
            family: PlatformFamily::current(),
            pointer_width: usize::BITS,
            library: platform_sys::library_handle()
                .and_then(NonZeroUsize::new)
                .map(LibraryHandle),
        };
        log::debug!("probed platform: {platform:?}");
        platform
    }

    #[inline]
    pub fn family(&self) -> PlatformFamily {
        self.family
    }

    /// Whether the process runs as a 64-bit program.
    #[inline]
    pub fn has_64bit(&self) -> bool {
        self.pointer_width == 64
    }

    #[inline]
    pub fn pointer_width(&self) -> u32 {
        self.pointer_width
    }

    /// Handle of the loaded platform module, `None` where the target has no loader API.
    #[inline]
    pub fn library_handle(&self) -> Option<LibraryHandle> {
        self.library
    }

    #[inline]
    pub fn native_order(&self) -> ByteOrder {
        ByteOrder::native()
    }

    /// Regular OS page size in bytes.
    pub fn page_size(&self) -> usize {
        nativemem_page_alloc::os::page_size()
    }

    /// Large (huge) page size in bytes.
    pub fn large_page_size(&self) -> usize {
        nativemem_page_alloc::os::large_page_size()
    }
}

/// Shorthand for [`Platform::current`].
pub fn platform() -> &'static Platform {
    Platform::current()
}
