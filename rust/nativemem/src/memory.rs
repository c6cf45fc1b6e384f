//! Address resolution and raw memory access.
//!
//! The functions taking a [`NativeAddress`] are `unsafe`: they cannot tell whether the
//! memory at that address is alive, large enough or writable. Those are the caller's
//! obligations. What they do check:
//! - a zero `length` is a no-op for [`fill`], [`copy`] and [`equals`], at any address;
//! - a null address with a non-zero length fails with `InvalidRange`;
//! - a range wrapping past the end of the address space fails with `InvalidRange`.
//!
//! Nothing here guards against use-after-free.

use nativemem_common::{Result, error::Error};

use crate::{
    address::NativeAddress,
    buffer::Buffer,
    element::Element,
    order::ByteOrder,
    raw,
    view::{ByteView, TypedView},
};

/// Address of the element at the buffer's current position.
///
/// # Errors
///
/// `UnsupportedBufferKind` if the buffer is not backed by addressable native memory.
pub fn address_of<B: Buffer + ?Sized>(buffer: &B) -> Result<NativeAddress> {
    address_at(buffer, buffer.position())
}

/// Address of the element at `index`, ignoring the buffer's position.
///
/// `index == capacity()` is allowed and yields the one-past-the-end address.
///
/// # Errors
///
/// `UnsupportedBufferKind` for buffers without a native address, `InvalidArgument`
/// if `index > capacity()`.
pub fn address_at<B: Buffer + ?Sized>(buffer: &B, index: usize) -> Result<NativeAddress> {
    let base = buffer
        .base_address()
        .ok_or_else(|| Error::unsupported_buffer_kind(buffer.kind().name()))?;
    if index > buffer.capacity() {
        return Err(Error::invalid_arg(
            "index",
            format!("{index} exceeds capacity {}", buffer.capacity()),
        ));
    }
    base.offset(index * buffer.element_size())
}

/// Like [`address_of`], but maps a missing or non-native buffer to the null address.
pub fn address_of_safe<B: Buffer + ?Sized>(buffer: Option<&B>) -> NativeAddress {
    buffer
        .and_then(|b| address_of(b).ok())
        .unwrap_or(NativeAddress::NULL)
}

/// Sets every byte in `[address, address + length)` to `value`.
///
/// # Safety
///
/// The range must be valid for writes.
pub unsafe fn fill(address: NativeAddress, value: u8, length: usize) -> Result<()> {
    raw::check_range(address, length)?;
    if length == 0 {
        return Ok(());
    }
    log::trace!("fill {length} bytes at {address} with {value:#04x}");
    unsafe { raw::set(address, value, length) };
    Ok(())
}

/// Copies `length` bytes from `src` to `dst`. Overlapping ranges are handled like
/// `memmove`.
///
/// # Safety
///
/// The source range must be valid for reads and the destination range for writes.
pub unsafe fn copy(src: NativeAddress, dst: NativeAddress, length: usize) -> Result<()> {
    raw::check_range(src, length)?;
    raw::check_range(dst, length)?;
    if length == 0 {
        return Ok(());
    }
    log::trace!("copy {length} bytes from {src} to {dst}");
    unsafe { raw::copy(src, dst, length) };
    Ok(())
}

/// Compares two byte ranges of the same length.
///
/// # Safety
///
/// Both ranges must be valid for reads.
pub unsafe fn equals(a: NativeAddress, b: NativeAddress, length: usize) -> Result<bool> {
    raw::check_range(a, length)?;
    raw::check_range(b, length)?;
    if length == 0 || a == b {
        return Ok(true);
    }
    Ok(unsafe { raw::bytes(a, length) == raw::bytes(b, length) })
}

/// A big-endian byte view of `length` bytes starting at `address`.
///
/// The order is big-endian whatever the host order is.
///
/// # Safety
///
/// `[address, address + length)` must stay valid for reads and writes for `'a`, and
/// must not be accessed through other references while the view is in use.
///
/// # Errors
///
/// `InvalidRange` for the null address or a range that wraps the address space.
pub unsafe fn new_view<'a>(address: NativeAddress, length: usize) -> Result<ByteView<'a>> {
    unsafe { new_view_with_order(address, length, ByteOrder::BigEndian) }
}

/// Like [`new_view`], but the view uses the host's native byte order.
///
/// # Safety
///
/// Same contract as [`new_view`].
pub unsafe fn new_view_native_order<'a>(
    address: NativeAddress,
    length: usize,
) -> Result<ByteView<'a>> {
    unsafe { new_view_with_order(address, length, ByteOrder::native()) }
}

/// A byte view with an explicit byte order.
///
/// # Safety
///
/// Same contract as [`new_view`].
pub unsafe fn new_view_with_order<'a>(
    address: NativeAddress,
    length: usize,
    order: ByteOrder,
) -> Result<ByteView<'a>> {
    check_view_base(address, length)?;
    log::trace!("new view at {address}, {length} bytes, {order}");
    Ok(unsafe { ByteView::from_raw_parts(address, length, order) })
}

/// A view of `count` elements of `T` starting at `address`. No alignment is required.
///
/// # Safety
///
/// `[address, address + count * T::SIZE)` must stay valid for reads and writes for
/// `'a`, and must not be accessed through other references while the view is in use.
///
/// # Errors
///
/// `InvalidRange` for the null address or a range that wraps the address space.
pub unsafe fn new_typed_view<'a, T: Element>(
    address: NativeAddress,
    count: usize,
    order: ByteOrder,
) -> Result<TypedView<'a, T>> {
    let length = count
        .checked_mul(T::SIZE)
        .ok_or_else(|| Error::invalid_range(address.into(), count, "element count overflow"))?;
    check_view_base(address, length)?;
    Ok(unsafe { TypedView::from_raw_parts(address, count, order) })
}

/// Reads one `T` at `address` in the given order. No alignment is required.
///
/// # Safety
///
/// `[address, address + T::SIZE)` must be valid for reads.
pub unsafe fn get<T: Element>(address: NativeAddress, order: ByteOrder) -> Result<T> {
    raw::check_range(address, T::SIZE)?;
    Ok(unsafe { raw::read(address, order) })
}

/// Writes one `T` at `address` in the given order. No alignment is required.
///
/// # Safety
///
/// `[address, address + T::SIZE)` must be valid for writes.
pub unsafe fn put<T: Element>(address: NativeAddress, value: T, order: ByteOrder) -> Result<()> {
    raw::check_range(address, T::SIZE)?;
    unsafe { raw::write(address, value, order) };
    Ok(())
}

/// # Safety
///
/// `address` must be valid for reads.
pub unsafe fn get_u8(address: NativeAddress) -> Result<u8> {
    unsafe { get(address, ByteOrder::native()) }
}

/// # Safety
///
/// `address` must be valid for writes.
pub unsafe fn put_u8(address: NativeAddress, value: u8) -> Result<()> {
    unsafe { put(address, value, ByteOrder::native()) }
}

fn check_view_base(address: NativeAddress, length: usize) -> Result<()> {
    if address.is_null() {
        return Err(Error::invalid_range(0, length, "view over the null address"));
    }
    raw::check_range(address, length)
}
