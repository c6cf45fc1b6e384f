//! Fixed-size values that can be read from and written to raw bytes in a given order.

use byteorder::{BE, ByteOrder as _, LE};

use crate::order::ByteOrder;

mod sealed {
    pub trait Sealed {}
}

/// A primitive value stored in a buffer as `SIZE` consecutive bytes.
pub trait Element: Copy + std::fmt::Debug + PartialEq + sealed::Sealed {
    const SIZE: usize;

    /// Decodes a value from the first `SIZE` bytes of `bytes`.
    fn decode(bytes: &[u8], order: ByteOrder) -> Self;

    /// Encodes `self` into the first `SIZE` bytes of `bytes`.
    fn encode(self, bytes: &mut [u8], order: ByteOrder);
}

impl sealed::Sealed for u8 {}

impl Element for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn decode(bytes: &[u8], _order: ByteOrder) -> Self {
        bytes[0]
    }

    #[inline]
    fn encode(self, bytes: &mut [u8], _order: ByteOrder) {
        bytes[0] = self;
    }
}

impl sealed::Sealed for i8 {}

impl Element for i8 {
    const SIZE: usize = 1;

    #[inline]
    fn decode(bytes: &[u8], _order: ByteOrder) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn encode(self, bytes: &mut [u8], _order: ByteOrder) {
        bytes[0] = self as u8;
    }
}

macro_rules! impl_element {
    ($ty:ty, $read:ident, $write:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn decode(bytes: &[u8], order: ByteOrder) -> Self {
                match order {
                    ByteOrder::BigEndian => BE::$read(bytes),
                    ByteOrder::LittleEndian => LE::$read(bytes),
                }
            }

            #[inline]
            fn encode(self, bytes: &mut [u8], order: ByteOrder) {
                match order {
                    ByteOrder::BigEndian => BE::$write(bytes, self),
                    ByteOrder::LittleEndian => LE::$write(bytes, self),
                }
            }
        }
    };
}

impl_element!(u16, read_u16, write_u16);
impl_element!(i16, read_i16, write_i16);
impl_element!(u32, read_u32, write_u32);
impl_element!(i32, read_i32, write_i32);
impl_element!(u64, read_u64, write_u64);
impl_element!(i64, read_i64, write_i64);
impl_element!(f32, read_f32, write_f32);
impl_element!(f64, read_f64, write_f64);

/// Largest `Element::SIZE`; sizes the stack scratch used for unaligned access.
pub(crate) const MAX_ELEMENT_SIZE: usize = 8;

#[cfg(test)]
mod tests {
    use super::Element;
    use crate::order::ByteOrder;

    #[test]
    fn test_decode_respects_order() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(u32::decode(&bytes, ByteOrder::BigEndian), 0x0102_0304);
        assert_eq!(u32::decode(&bytes, ByteOrder::LittleEndian), 0x0403_0201);
        assert_eq!(i16::decode(&bytes[2..], ByteOrder::BigEndian), 0x0304);
        assert_eq!(u8::decode(&bytes[3..], ByteOrder::LittleEndian), 4);
    }

    #[test]
    fn test_encode_respects_order() {
        let mut bytes = [0u8; 8];
        1.5f64.encode(&mut bytes, ByteOrder::BigEndian);
        assert_eq!(bytes, 1.5f64.to_be_bytes());
        (-2i32).encode(&mut bytes, ByteOrder::LittleEndian);
        assert_eq!(&bytes[..4], &(-2i32).to_le_bytes());
        (-1i8).encode(&mut bytes, ByteOrder::BigEndian);
        assert_eq!(bytes[0], 0xFF);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(<i8 as Element>::SIZE, 1);
        assert_eq!(<u16 as Element>::SIZE, 2);
        assert_eq!(<f32 as Element>::SIZE, 4);
        assert_eq!(<i64 as Element>::SIZE, 8);
        assert!(<f64 as Element>::SIZE <= super::MAX_ELEMENT_SIZE);
    }
}
