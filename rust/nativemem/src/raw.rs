//! Address-to-pointer boundary.
//!
//! Every conversion from a [`NativeAddress`] to a pointer or a slice happens here. The
//! rest of the crate handles addresses as plain integers.

use nativemem_common::{Result, error::Error};

use crate::{
    address::NativeAddress,
    element::{Element, MAX_ELEMENT_SIZE},
    order::ByteOrder,
};

/// Rejects the null address and ranges running past the end of the address space.
///
/// Zero-length ranges are accepted anywhere, including at the null address.
pub(crate) fn check_range(address: NativeAddress, length: usize) -> Result<()> {
    if length == 0 {
        return Ok(());
    }
    if address.is_null() {
        return Err(Error::invalid_range(0, length, "null address"));
    }
    if address.checked_add(length).is_none() {
        return Err(Error::invalid_range(
            address.into(),
            length,
            "range exceeds the address space",
        ));
    }
    Ok(())
}

#[inline]
fn as_ptr(address: NativeAddress) -> *const u8 {
    address.get() as *const u8
}

#[inline]
fn as_mut_ptr(address: NativeAddress) -> *mut u8 {
    address.get() as *mut u8
}

/// # Safety
///
/// `[address, address + length)` must be valid for writes.
#[inline]
pub(crate) unsafe fn set(address: NativeAddress, value: u8, length: usize) {
    unsafe { std::ptr::write_bytes(as_mut_ptr(address), value, length) }
}

/// Copies with `memmove` semantics.
///
/// # Safety
///
/// The source range must be valid for reads and the destination range valid for
/// writes. The two may overlap.
#[inline]
pub(crate) unsafe fn copy(src: NativeAddress, dst: NativeAddress, length: usize) {
    unsafe { std::ptr::copy(as_ptr(src), as_mut_ptr(dst), length) }
}

/// # Safety
///
/// `[address, address + T::SIZE)` must be valid for reads. No alignment is required.
#[inline]
pub(crate) unsafe fn read<T: Element>(address: NativeAddress, order: ByteOrder) -> T {
    let mut scratch = [0u8; MAX_ELEMENT_SIZE];
    unsafe {
        std::ptr::copy_nonoverlapping(as_ptr(address), scratch.as_mut_ptr(), T::SIZE);
    }
    T::decode(&scratch[..T::SIZE], order)
}

/// # Safety
///
/// `[address, address + T::SIZE)` must be valid for writes. No alignment is required.
#[inline]
pub(crate) unsafe fn write<T: Element>(address: NativeAddress, value: T, order: ByteOrder) {
    let mut scratch = [0u8; MAX_ELEMENT_SIZE];
    value.encode(&mut scratch[..T::SIZE], order);
    unsafe {
        std::ptr::copy_nonoverlapping(scratch.as_ptr(), as_mut_ptr(address), T::SIZE);
    }
}

/// # Safety
///
/// `[address, address + length)` must be valid for reads and must not be written
/// through any other path for the lifetime `'a`.
#[inline]
pub(crate) unsafe fn bytes<'a>(address: NativeAddress, length: usize) -> &'a [u8] {
    if length == 0 {
        return &[];
    }
    unsafe { std::slice::from_raw_parts(as_ptr(address), length) }
}

/// # Safety
///
/// `[address, address + length)` must be valid for writes and must not be accessed
/// through any other path for the lifetime `'a`.
#[inline]
pub(crate) unsafe fn bytes_mut<'a>(address: NativeAddress, length: usize) -> &'a mut [u8] {
    if length == 0 {
        return &mut [];
    }
    unsafe { std::slice::from_raw_parts_mut(as_mut_ptr(address), length) }
}
