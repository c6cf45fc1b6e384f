//! Buffers: a region of bytes with a position/limit window and a byte order.
//!
//! Two owning buffer types live here:
//! - [`DirectBuffer`], backed by OS pages and therefore natively addressable;
//! - [`HeapBuffer`], backed by a `Vec<u8>` that may move, and therefore not addressable.
//!
//! The non-owning views over native memory are in [`crate::view`].

use nativemem_common::{Result, error::Error, verify_arg};
use nativemem_page_alloc::{PageBuffer, PageKind};

use crate::{
    address::NativeAddress,
    element::Element,
    order::ByteOrder,
    view::{ByteView, TypedView},
};

/// Position/limit window over a buffer of fixed capacity, counted in elements.
///
/// Always satisfies `position <= limit <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    capacity: usize,
    position: usize,
    limit: usize,
}

impl Window {
    /// A window covering the whole capacity.
    pub(crate) fn new(capacity: usize) -> Window {
        Window {
            capacity,
            position: 0,
            limit: capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn set_position(&mut self, position: usize) -> Result<()> {
        verify_arg!(position, position <= self.limit);
        self.position = position;
        Ok(())
    }

    /// Moves the limit; the position is pulled back if it ends up past the new limit.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        verify_arg!(limit, limit <= self.capacity);
        self.limit = limit;
        self.position = self.position.min(limit);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity;
    }

    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

/// What backs a buffer's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Rust heap memory that may be moved; no stable native address.
    Heap,
    /// Native memory owned by the buffer.
    Direct,
    /// Native memory owned by someone else.
    View,
}

impl BufferKind {
    /// Whether buffers of this kind expose a stable native address.
    #[inline]
    pub fn is_native(self) -> bool {
        !matches!(self, BufferKind::Heap)
    }

    pub fn name(self) -> &'static str {
        match self {
            BufferKind::Heap => "heap",
            BufferKind::Direct => "direct",
            BufferKind::View => "view",
        }
    }
}

pub(crate) mod sealed {
    use super::Window;

    /// Mutable window access, only reachable from inside this crate.
    pub trait WindowMut {
        fn window_mut(&mut self) -> &mut Window;
    }
}

/// Common surface of all buffers.
///
/// Capacity, position and limit are counted in elements of `element_size()` bytes.
/// The capacity is fixed when the buffer is created; the window can only be moved
/// inside it:
///
/// ```compile_fail
/// use nativemem::{Buffer, DirectBuffer};
///
/// let mut buffer = DirectBuffer::allocate(8).unwrap();
/// let _ = buffer.window_mut();
/// ```
///
/// ```compile_fail
/// let _ = nativemem::buffer::Window::new(1 << 20);
/// ```
pub trait Buffer: sealed::WindowMut {
    fn window(&self) -> &Window;

    /// Size in bytes of one element.
    fn element_size(&self) -> usize;

    fn order(&self) -> ByteOrder;

    fn kind(&self) -> BufferKind;

    /// Native address of element 0, or `None` when the buffer is not backed by
    /// addressable native memory.
    fn base_address(&self) -> Option<NativeAddress>;

    #[inline]
    fn capacity(&self) -> usize {
        self.window().capacity()
    }

    #[inline]
    fn position(&self) -> usize {
        self.window().position()
    }

    #[inline]
    fn limit(&self) -> usize {
        self.window().limit()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.window().remaining()
    }

    #[inline]
    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    fn set_position(&mut self, position: usize) -> Result<()> {
        sealed::WindowMut::window_mut(self).set_position(position)
    }

    fn set_limit(&mut self, limit: usize) -> Result<()> {
        sealed::WindowMut::window_mut(self).set_limit(limit)
    }

    fn clear(&mut self) {
        sealed::WindowMut::window_mut(self).clear();
    }

    fn flip(&mut self) {
        sealed::WindowMut::window_mut(self).flip();
    }

    fn rewind(&mut self) {
        sealed::WindowMut::window_mut(self).rewind();
    }
}

/// Which pages a [`DirectBuffer`] is allocated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePolicy {
    #[default]
    Regular,
    Large,
    /// Large pages when the host allows it, regular pages otherwise.
    LargeWithFallback,
}

/// Allocation settings for [`DirectBuffer::allocate_with`].
#[derive(Debug, Clone)]
pub struct AllocationOptions {
    pub page_policy: PagePolicy,
    /// Initial order of the buffer. Defaults to the host order.
    pub order: ByteOrder,
}

impl AllocationOptions {
    pub fn new() -> AllocationOptions {
        AllocationOptions::default()
    }

    pub fn page_policy(mut self, page_policy: PagePolicy) -> Self {
        self.page_policy = page_policy;
        self
    }

    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }
}

impl Default for AllocationOptions {
    fn default() -> Self {
        AllocationOptions {
            page_policy: PagePolicy::Regular,
            order: ByteOrder::native(),
        }
    }
}

/// A byte buffer that owns native memory with a stable address.
#[derive(Debug)]
pub struct DirectBuffer {
    pages: PageBuffer,
    window: Window,
    order: ByteOrder,
}

impl DirectBuffer {
    /// Allocates a zeroed buffer of `capacity` bytes in host byte order.
    pub fn allocate(capacity: usize) -> Result<DirectBuffer> {
        Self::allocate_with(capacity, &AllocationOptions::default())
    }

    pub fn allocate_with(capacity: usize, options: &AllocationOptions) -> Result<DirectBuffer> {
        let pages = match options.page_policy {
            PagePolicy::Regular => PageBuffer::allocate(capacity, PageKind::Regular),
            PagePolicy::Large => PageBuffer::allocate(capacity, PageKind::Large),
            PagePolicy::LargeWithFallback => PageBuffer::allocate_with_fallback(capacity),
        }
        .map_err(|e| Error::io(format!("allocate direct buffer of {capacity} bytes"), e))?;
        log::debug!(
            "allocated direct buffer: capacity={capacity} address={:p} pages={:?} order={}",
            pages.as_ptr(),
            pages.kind(),
            options.order
        );
        Ok(DirectBuffer {
            pages,
            window: Window::new(capacity),
            order: options.order,
        })
    }

    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// Kind of OS pages backing this buffer.
    pub fn page_kind(&self) -> PageKind {
        self.pages.kind()
    }

    /// Byte at absolute `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.check_index(index, 1);
        self.pages[index]
    }

    /// Writes a byte at absolute `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    #[inline]
    pub fn put(&mut self, index: usize, value: u8) {
        self.check_index(index, 1);
        self.pages[index] = value;
    }

    /// Decodes a `T` at absolute byte `index`, in this buffer's order.
    ///
    /// # Panics
    ///
    /// Panics if `index + T::SIZE > limit()`.
    pub fn get_value<T: Element>(&self, index: usize) -> T {
        self.check_index(index, T::SIZE);
        T::decode(&self.pages[index..index + T::SIZE], self.order)
    }

    /// Encodes `value` at absolute byte `index`, in this buffer's order.
    ///
    /// # Panics
    ///
    /// Panics if `index + T::SIZE > limit()`.
    pub fn put_value<T: Element>(&mut self, index: usize, value: T) {
        self.check_index(index, T::SIZE);
        let order = self.order;
        value.encode(&mut self.pages[index..index + T::SIZE], order);
    }

    /// All `capacity()` bytes, ignoring the window.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pages
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pages
    }

    /// All whole elements of `T` in the buffer, in host order, ignoring the window and
    /// the buffer's byte order.
    ///
    /// The buffer starts on a page boundary, so any `T` is suitably aligned.
    #[inline]
    pub fn as_slice<T: bytemuck::AnyBitPattern>(&self) -> &[T] {
        self.pages.as_slice()
    }

    #[inline]
    pub fn as_mut_slice<T>(&mut self) -> &mut [T]
    where
        T: bytemuck::AnyBitPattern + bytemuck::NoUninit,
    {
        self.pages.as_mut_slice()
    }

    /// A view over the whole buffer, sharing its window and order.
    pub fn as_view(&mut self) -> ByteView<'_> {
        let base = NativeAddress::from_ptr(self.pages.as_mut_ptr());
        let mut view = unsafe { ByteView::from_raw_parts(base, self.window.capacity, self.order) };
        *sealed::WindowMut::window_mut(&mut view) = self.window;
        view
    }

    /// A big-endian view over `[position, limit)` with its own window.
    pub fn slice(&mut self) -> ByteView<'_> {
        let base = NativeAddress::from_ptr(self.pages.as_mut_ptr()) + self.window.position;
        let len = self.window.remaining();
        unsafe { ByteView::from_raw_parts(base, len, ByteOrder::BigEndian) }
    }

    /// A view of `[position, limit)` as elements of `T` in this buffer's order.
    ///
    /// Trailing bytes that do not form a whole element are not part of the view.
    pub fn as_typed<T: Element>(&mut self) -> TypedView<'_, T> {
        let base = NativeAddress::from_ptr(self.pages.as_mut_ptr()) + self.window.position;
        let count = self.window.remaining() / T::SIZE;
        unsafe { TypedView::from_raw_parts(base, count, self.order) }
    }

    #[inline]
    fn check_index(&self, index: usize, size: usize) {
        assert!(
            index.checked_add(size).is_some_and(|end| end <= self.window.limit),
            "index {index} (+{size}) out of bounds for limit {}",
            self.window.limit
        );
    }
}

impl sealed::WindowMut for DirectBuffer {
    #[inline]
    fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

impl Buffer for DirectBuffer {
    #[inline]
    fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    fn element_size(&self) -> usize {
        1
    }

    #[inline]
    fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    fn kind(&self) -> BufferKind {
        BufferKind::Direct
    }

    #[inline]
    fn base_address(&self) -> Option<NativeAddress> {
        Some(NativeAddress::from_ptr(self.pages.as_ptr()))
    }
}

/// A byte buffer over Rust heap memory.
///
/// Its storage may be reallocated or moved, so it never reports a native address.
#[derive(Debug, Clone)]
pub struct HeapBuffer {
    data: Vec<u8>,
    window: Window,
    order: ByteOrder,
}

impl HeapBuffer {
    /// A zeroed big-endian buffer of `capacity` bytes.
    pub fn allocate(capacity: usize) -> HeapBuffer {
        HeapBuffer::from(vec![0u8; capacity])
    }

    pub fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        assert!(index < self.window.limit, "index {index} out of bounds");
        self.data[index]
    }

    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    #[inline]
    pub fn put(&mut self, index: usize, value: u8) {
        assert!(index < self.window.limit, "index {index} out of bounds");
        self.data[index] = value;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for HeapBuffer {
    fn from(data: Vec<u8>) -> Self {
        HeapBuffer {
            window: Window::new(data.len()),
            data,
            order: ByteOrder::BigEndian,
        }
    }
}

impl sealed::WindowMut for HeapBuffer {
    #[inline]
    fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

impl Buffer for HeapBuffer {
    #[inline]
    fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    fn element_size(&self) -> usize {
        1
    }

    #[inline]
    fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    fn kind(&self) -> BufferKind {
        BufferKind::Heap
    }

    #[inline]
    fn base_address(&self) -> Option<NativeAddress> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_transitions() {
        let mut w = Window::new(32);
        assert_eq!((w.position(), w.limit(), w.remaining()), (0, 32, 32));

        w.set_position(8).unwrap();
        w.set_limit(24).unwrap();
        assert_eq!(w.remaining(), 16);

        assert!(w.set_position(25).is_err());
        assert!(w.set_limit(33).is_err());

        w.set_limit(4).unwrap();
        assert_eq!(w.position(), 4);

        w.flip();
        assert_eq!((w.position(), w.limit()), (0, 4));

        w.clear();
        assert_eq!((w.position(), w.limit()), (0, 32));
    }

    #[test]
    fn test_direct_buffer_basics() {
        let mut buffer = DirectBuffer::allocate(32).unwrap();
        assert_eq!(buffer.capacity(), 32);
        assert_eq!(buffer.kind(), BufferKind::Direct);
        assert_eq!(buffer.order(), ByteOrder::native());
        assert_eq!(buffer.page_kind(), PageKind::Regular);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));

        for i in 0..buffer.capacity() {
            buffer.put(i, i as u8);
        }
        assert_eq!(buffer.get(31), 31);
        assert!(buffer.base_address().is_some_and(|a| !a.is_null()));
    }

    #[test]
    fn test_direct_buffer_values_follow_order() {
        let options = AllocationOptions::new().order(ByteOrder::BigEndian);
        let mut buffer = DirectBuffer::allocate_with(16, &options).unwrap();
        buffer.put_value(4, 0x0102_0304u32);
        assert_eq!(&buffer.as_bytes()[4..8], &[1, 2, 3, 4]);

        buffer.set_order(ByteOrder::LittleEndian);
        assert_eq!(buffer.get_value::<u32>(4), 0x0403_0201);
        buffer.put_value(8, 2.5f64);
        assert_eq!(&buffer.as_bytes()[8..16], &2.5f64.to_le_bytes());
    }

    #[test]
    fn test_direct_buffer_host_order_slices() {
        let mut buffer = DirectBuffer::allocate(18).unwrap();
        buffer.set_order(ByteOrder::BigEndian);
        buffer.as_mut_slice::<u32>()[1] = 0x0102_0304;
        assert_eq!(buffer.as_slice::<u32>().len(), 4);
        assert_eq!(&buffer.as_bytes()[4..8], &0x0102_0304u32.to_ne_bytes());
        assert_eq!(buffer.get_value::<u32>(4), u32::from_be_bytes(0x0102_0304u32.to_ne_bytes()));

        buffer.as_mut_slice::<f64>()[0] = 1.5;
        assert_eq!(buffer.as_slice::<f64>(), &[1.5, 0.0]);
    }

    #[test]
    #[should_panic]
    fn test_direct_buffer_get_past_limit() {
        let mut buffer = DirectBuffer::allocate(8).unwrap();
        buffer.set_limit(4).unwrap();
        let _ = buffer.get(4);
    }

    #[test]
    fn test_fallback_allocation() {
        let options = AllocationOptions::new().page_policy(PagePolicy::LargeWithFallback);
        let buffer = DirectBuffer::allocate_with(64, &options).unwrap();
        assert_eq!(buffer.capacity(), 64);
    }

    #[test]
    fn test_slice_is_big_endian_window() {
        let mut buffer = DirectBuffer::allocate(32).unwrap();
        for i in 0..32 {
            buffer.put(i, i as u8);
        }
        buffer.set_position(8).unwrap();
        buffer.set_limit(24).unwrap();

        let slice = buffer.slice();
        assert_eq!(slice.capacity(), 16);
        assert_eq!(slice.order(), ByteOrder::BigEndian);
        assert_eq!(slice.get(0), 8);
        assert_eq!(slice.get(15), 23);
    }

    #[test]
    fn test_as_view_shares_window() {
        let mut buffer = DirectBuffer::allocate(16).unwrap();
        buffer.set_position(2).unwrap();
        let mut view = buffer.as_view();
        assert_eq!(view.position(), 2);
        assert_eq!(view.order(), ByteOrder::native());
        view.put(5, 0xAB);
        assert_eq!(buffer.get(5), 0xAB);
    }

    #[test]
    fn test_window_stays_within_capacity() {
        let mut buffer = DirectBuffer::allocate(8).unwrap();
        assert!(buffer.set_limit(9).is_err());
        assert!(buffer.set_limit(usize::MAX).is_err());
        assert!(buffer.set_position(9).is_err());
        assert_eq!(buffer.capacity(), 8);

        buffer.set_position(6).unwrap();
        buffer.flip();
        buffer.clear();
        buffer.rewind();
        assert_eq!((buffer.position(), buffer.limit(), buffer.capacity()), (0, 8, 8));

        let mut view = buffer.as_view();
        assert!(view.set_limit(4096).is_err());
        view.clear();
        assert_eq!(view.limit(), 8);
        assert_eq!(view.as_bytes().len(), 8);

        let mut slice = view.slice();
        assert!(slice.set_limit(9).is_err());
        assert_eq!(slice.capacity(), 8);
    }

    #[test]
    fn test_heap_buffer_has_no_address() {
        let mut buffer = HeapBuffer::allocate(8);
        buffer.put(1, 9);
        assert_eq!(buffer.get(1), 9);
        assert_eq!(buffer.kind(), BufferKind::Heap);
        assert!(!buffer.kind().is_native());
        assert!(buffer.base_address().is_none());
        assert_eq!(buffer.into_inner()[1], 9);
    }
}
