//! Typed views and raw access over native memory.
//!
//! - [`buffer`]: the [`Buffer`](buffer::Buffer) trait, page-backed
//!   [`DirectBuffer`](buffer::DirectBuffer)s and non-addressable
//!   [`HeapBuffer`](buffer::HeapBuffer)s.
//! - [`view`]: non-owning byte and element views with an explicit byte order.
//! - [`memory`]: address resolution, fill/copy over raw addresses, and view
//!   construction at arbitrary addresses.
//! - [`platform`]: 64-bit query and the loaded platform module handle.
//!
//! All address-to-pointer conversions are confined to a single internal module.

pub mod address;
pub mod buffer;
pub mod element;
pub mod memory;
pub mod order;
pub mod platform;
pub mod view;

mod raw;

#[cfg_attr(unix, path = "platform_unix.rs")]
#[cfg_attr(windows, path = "platform_windows.rs")]
#[cfg_attr(not(any(unix, windows)), path = "platform_fallback.rs")]
mod platform_sys;

pub use address::NativeAddress;
pub use buffer::{AllocationOptions, Buffer, BufferKind, DirectBuffer, HeapBuffer, PagePolicy};
pub use element::Element;
pub use order::ByteOrder;
pub use platform::{LibraryHandle, Platform, platform};
pub use view::{ByteView, TypedView};

#[cfg(test)]
mod tests;
