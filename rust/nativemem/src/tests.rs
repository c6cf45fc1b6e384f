use crate::{
    address::NativeAddress,
    buffer::{Buffer, DirectBuffer, HeapBuffer},
    memory,
    order::ByteOrder,
};

fn indexed_buffer(capacity: usize) -> DirectBuffer {
    let mut buffer = DirectBuffer::allocate(capacity).unwrap();
    for i in 0..buffer.capacity() {
        buffer.put(i, i as u8);
    }
    buffer
}

fn random_buffer(capacity: usize, rng: &mut fastrand::Rng) -> DirectBuffer {
    let mut buffer = DirectBuffer::allocate(capacity).unwrap();
    rng.fill(buffer.as_bytes_mut());
    buffer
}

#[test]
fn test_fill() {
    let buffer = indexed_buffer(32);
    let address = memory::address_of(&buffer).unwrap();

    unsafe { memory::fill(address, 0x7F, buffer.capacity()).unwrap() };

    for i in 0..buffer.capacity() {
        assert_eq!(buffer.get(i), 0x7F);
    }
}

#[test]
fn test_copy() {
    let src = indexed_buffer(32);
    let dst = DirectBuffer::allocate(32).unwrap();

    unsafe {
        memory::copy(
            memory::address_of(&src).unwrap(),
            memory::address_of(&dst).unwrap(),
            src.capacity(),
        )
        .unwrap();
    }

    for i in 0..src.capacity() {
        assert_eq!(src.get(i), dst.get(i));
    }
}

#[test]
fn test_new_view_is_big_endian() {
    let buffer = indexed_buffer(32);
    let address = memory::address_of(&buffer).unwrap();
    assert!(!address.is_null());

    let view = unsafe { memory::new_view(address + 8, 16).unwrap() };
    assert_eq!(view.order(), ByteOrder::BigEndian);
    assert_eq!(view.capacity(), 16);
    for i in 0..view.capacity() {
        assert_eq!(view.get(i), buffer.get(i + 8));
        assert_eq!(view.get(i), 8 + i as u8);
    }
}

#[test]
fn test_new_view_native_order() {
    let buffer = indexed_buffer(32);
    let address = memory::address_of(&buffer).unwrap();

    let view = unsafe { memory::new_view_native_order(address + 8, 16).unwrap() };
    assert_eq!(view.order(), ByteOrder::native());
    for i in 0..view.capacity() {
        assert_eq!(view.get(i), buffer.get(i + 8));
    }
}

#[test]
fn test_address_of_sliced_typed_view() {
    let mut buffer = indexed_buffer(32);
    let address = memory::address_of(&buffer).unwrap();
    assert!(!address.is_null());

    buffer.set_position(8).unwrap();
    buffer.set_limit(8 + 16).unwrap();

    let floats = buffer
        .slice()
        .with_order(ByteOrder::native())
        .as_typed::<f32>();

    assert_eq!(floats.capacity(), 4);
    assert_eq!(memory::address_of(&floats).unwrap(), address + 8);
}

#[test]
fn test_address_of_follows_position() {
    let mut buffer = DirectBuffer::allocate(16).unwrap();
    let base = memory::address_of(&buffer).unwrap();
    buffer.set_position(5).unwrap();
    assert_eq!(memory::address_of(&buffer).unwrap(), base + 5);
    assert_eq!(memory::address_at(&buffer, 16).unwrap(), base + 16);
    assert!(memory::address_at(&buffer, 17).is_err());

    let mut ints = buffer.as_typed::<i32>();
    ints.set_position(1).unwrap();
    assert_eq!(memory::address_of(&ints).unwrap(), base + 5 + 4);
}

#[test]
fn test_heap_buffer_is_not_addressable() {
    let buffer = HeapBuffer::allocate(32);
    let err = memory::address_of(&buffer).unwrap_err();
    assert!(err.is_unsupported_buffer_kind());
    assert!(err.to_string().contains("heap"));

    assert!(memory::address_of_safe(Some(&buffer)).is_null());
    assert!(memory::address_of_safe::<HeapBuffer>(None).is_null());

    let direct = DirectBuffer::allocate(4).unwrap();
    assert_eq!(
        memory::address_of_safe(Some(&direct)),
        memory::address_of(&direct).unwrap()
    );
}

#[test]
fn test_zero_length_and_null_ranges() {
    unsafe {
        memory::fill(NativeAddress::NULL, 1, 0).unwrap();
        memory::copy(NativeAddress::NULL, NativeAddress::NULL, 0).unwrap();
        assert!(memory::equals(NativeAddress::NULL, NativeAddress::NULL, 0).unwrap());

        assert!(memory::fill(NativeAddress::NULL, 1, 4).unwrap_err().is_invalid_range());
        let buffer = DirectBuffer::allocate(4).unwrap();
        let address = memory::address_of(&buffer).unwrap();
        assert!(memory::copy(address, NativeAddress::NULL, 4).unwrap_err().is_invalid_range());
        assert!(memory::copy(NativeAddress::NULL, address, 4).unwrap_err().is_invalid_range());

        assert!(memory::new_view(NativeAddress::NULL, 0).unwrap_err().is_invalid_range());
        assert!(
            memory::new_view_native_order(NativeAddress::new(usize::MAX), 2)
                .unwrap_err()
                .is_invalid_range()
        );

        let empty = memory::new_view(address, 0).unwrap();
        assert_eq!(empty.capacity(), 0);
        assert!(empty.as_bytes().is_empty());
    }
}

#[test]
fn test_overlapping_copy_moves() {
    let buffer = indexed_buffer(32);
    let address = memory::address_of(&buffer).unwrap();

    unsafe { memory::copy(address, address + 2, 16).unwrap() };

    assert_eq!(buffer.get(0), 0);
    assert_eq!(buffer.get(1), 1);
    for i in 0..16 {
        assert_eq!(buffer.get(i + 2), i as u8);
    }
    assert_eq!(buffer.get(18), 18);
}

#[test]
fn test_view_writes_reach_buffer() {
    let buffer = DirectBuffer::allocate(16).unwrap();
    let address = memory::address_of(&buffer).unwrap();

    let mut view = unsafe { memory::new_view(address + 4, 8).unwrap() };
    view.put_value(0, 0x0A0B_0C0Du32);
    view.put(7, 0xEE);

    assert_eq!(&buffer.as_bytes()[4..8], &[0x0A, 0x0B, 0x0C, 0x0D]);
    assert_eq!(buffer.get(11), 0xEE);
}

#[test]
fn test_typed_view_over_address() {
    let mut buffer = DirectBuffer::allocate(32).unwrap();
    buffer.set_order(ByteOrder::LittleEndian);
    for i in 0..4 {
        buffer.put_value(i * 8, (i as f64) * 0.5);
    }
    let address = memory::address_of(&buffer).unwrap();

    let doubles =
        unsafe { memory::new_typed_view::<f64>(address, 4, ByteOrder::LittleEndian).unwrap() };
    assert_eq!(doubles.to_vec(), vec![0.0, 0.5, 1.0, 1.5]);

    let swapped =
        unsafe { memory::new_typed_view::<u16>(address + 8, 1, ByteOrder::BigEndian).unwrap() };
    assert_eq!(swapped.get(0), u16::from_be_bytes([buffer.get(8), buffer.get(9)]));

    assert!(
        unsafe { memory::new_typed_view::<u64>(address, usize::MAX, ByteOrder::BigEndian) }
            .unwrap_err()
            .is_invalid_range()
    );
}

#[test]
fn test_get_put_at_address() {
    let buffer = DirectBuffer::allocate(16).unwrap();
    let address = memory::address_of(&buffer).unwrap();
    unsafe {
        memory::put(address + 1, -3i16, ByteOrder::BigEndian).unwrap();
        assert_eq!(buffer.get(1), 0xFF);
        assert_eq!(buffer.get(2), 0xFD);
        assert_eq!(memory::get::<i16>(address + 1, ByteOrder::BigEndian).unwrap(), -3);

        memory::put_u8(address + 15, 0x42).unwrap();
        assert_eq!(memory::get_u8(address + 15).unwrap(), 0x42);
        assert!(memory::get_u8(NativeAddress::NULL).unwrap_err().is_invalid_range());
    }
}

#[test]
fn test_equals() {
    let a = indexed_buffer(32);
    let b = indexed_buffer(32);
    let (pa, pb) = (
        memory::address_of(&a).unwrap(),
        memory::address_of(&b).unwrap(),
    );
    unsafe {
        assert!(memory::equals(pa, pb, 32).unwrap());
        memory::put_u8(pb + 31, 0).unwrap();
        assert!(!memory::equals(pa, pb, 32).unwrap());
        assert!(memory::equals(pa, pb, 31).unwrap());
    }
}

#[test]
fn test_fill_random_ranges() {
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    for _ in 0..100 {
        let capacity = rng.usize(1..512);
        let buffer = random_buffer(capacity, &mut rng);
        let before = buffer.as_bytes().to_vec();
        let start = rng.usize(0..capacity);
        let len = rng.usize(0..=capacity - start);
        let value = rng.u8(..);

        let address = memory::address_of(&buffer).unwrap();
        unsafe { memory::fill(address + start, value, len).unwrap() };

        let after = buffer.as_bytes();
        assert!(after[start..start + len].iter().all(|&b| b == value));
        assert_eq!(&after[..start], &before[..start]);
        assert_eq!(&after[start + len..], &before[start + len..]);
    }
}

#[test]
fn test_copy_random_buffers() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..100 {
        let capacity = rng.usize(1..512);
        let src = random_buffer(capacity, &mut rng);
        let dst = DirectBuffer::allocate(capacity + rng.usize(0..64)).unwrap();

        unsafe {
            memory::copy(
                memory::address_of(&src).unwrap(),
                memory::address_of(&dst).unwrap(),
                capacity,
            )
            .unwrap();
        }
        assert_eq!(&dst.as_bytes()[..capacity], src.as_bytes());
        assert!(dst.as_bytes()[capacity..].iter().all(|&b| b == 0));
    }
}

#[test]
fn test_views_match_source_bytes() {
    let mut rng = fastrand::Rng::with_seed(42);
    let buffer = random_buffer(256, &mut rng);
    let address = memory::address_of(&buffer).unwrap();
    for _ in 0..200 {
        let k = rng.usize(0..256);
        let len = rng.usize(0..=256 - k);
        let view = unsafe { memory::new_view(address + k, len).unwrap() };
        assert_eq!(view.as_bytes(), &buffer.as_bytes()[k..k + len]);
        if len >= 4 {
            assert_eq!(
                view.get_value::<u32>(0),
                u32::from_be_bytes(buffer.as_bytes()[k..k + 4].try_into().unwrap())
            );
        }
    }
}
