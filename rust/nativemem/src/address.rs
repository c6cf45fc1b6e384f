//! Native addresses.

use nativemem_common::{Result, error::Error};

/// An integer identifying one byte of native memory.
///
/// An address says nothing about the lifetime of the memory behind it: it is only
/// meaningful while the allocation it was taken from is alive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NativeAddress(usize);

impl NativeAddress {
    pub const NULL: NativeAddress = NativeAddress(0);

    #[inline]
    pub const fn new(address: usize) -> NativeAddress {
        NativeAddress(address)
    }

    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> NativeAddress {
        NativeAddress(ptr as usize)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn checked_add(self, offset: usize) -> Option<NativeAddress> {
        self.0.checked_add(offset).map(NativeAddress)
    }

    /// Address `offset` bytes past `self`.
    ///
    /// # Errors
    ///
    /// `InvalidRange` if the result does not fit the address space.
    pub fn offset(self, offset: usize) -> Result<NativeAddress> {
        self.checked_add(offset)
            .ok_or_else(|| Error::invalid_range(self.0 as u64, offset, "address overflow"))
    }

    /// Byte distance from `origin` to `self`, if `self` is not below `origin`.
    #[inline]
    pub fn distance_from(self, origin: NativeAddress) -> Option<usize> {
        self.0.checked_sub(origin.0)
    }
}

/// # Panics
///
/// Panics if the sum wraps the address space, in every build profile. Use
/// [`NativeAddress::offset`] to get an `InvalidRange` error instead.
impl std::ops::Add<usize> for NativeAddress {
    type Output = NativeAddress;

    #[inline]
    fn add(self, offset: usize) -> NativeAddress {
        match self.checked_add(offset) {
            Some(address) => address,
            None => panic!("address {self} + {offset} overflows"),
        }
    }
}

/// # Panics
///
/// Panics if the sum wraps the address space.
impl std::ops::AddAssign<usize> for NativeAddress {
    #[inline]
    fn add_assign(&mut self, offset: usize) {
        *self = *self + offset;
    }
}

impl From<NativeAddress> for u64 {
    #[inline]
    fn from(address: NativeAddress) -> u64 {
        address.0 as u64
    }
}

impl std::fmt::Debug for NativeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeAddress({:#x})", self.0)
    }
}

impl std::fmt::Display for NativeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl std::fmt::LowerHex for NativeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}
