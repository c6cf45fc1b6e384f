//! Non-owning views over native memory.
//!
//! A view is a tagged `{base address, window, byte order}` triple. It never owns or
//! frees the memory it points at; the lifetime `'a` ties it to its source when it is
//! derived from a [`DirectBuffer`](crate::buffer::DirectBuffer), and is chosen freely by
//! the caller when the view is built from a raw address.

use std::marker::PhantomData;

use crate::{
    address::NativeAddress,
    buffer::{Buffer, BufferKind, Window, sealed::WindowMut},
    element::Element,
    order::ByteOrder,
    raw,
};

/// A byte buffer over memory owned elsewhere.
pub struct ByteView<'a> {
    base: NativeAddress,
    window: Window,
    order: ByteOrder,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> ByteView<'a> {
    /// # Safety
    ///
    /// `[base, base + capacity)` must be valid for reads and writes for `'a`, and must
    /// not be accessed through references created elsewhere while the view is in use.
    pub(crate) unsafe fn from_raw_parts(
        base: NativeAddress,
        capacity: usize,
        order: ByteOrder,
    ) -> ByteView<'a> {
        ByteView {
            base,
            window: Window::new(capacity),
            order,
            _marker: PhantomData,
        }
    }

    /// Address of byte 0 of the view.
    #[inline]
    pub fn address(&self) -> NativeAddress {
        self.base
    }

    pub fn with_order(mut self, order: ByteOrder) -> ByteView<'a> {
        self.order = order;
        self
    }

    /// Byte at absolute `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.get_value(index)
    }

    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    #[inline]
    pub fn put(&mut self, index: usize, value: u8) {
        self.put_value(index, value);
    }

    /// Decodes a `T` at absolute byte `index`, in this view's order.
    ///
    /// # Panics
    ///
    /// Panics if `index + T::SIZE > limit()`.
    pub fn get_value<T: Element>(&self, index: usize) -> T {
        self.check_index(index, T::SIZE);
        unsafe { raw::read(self.base + index, self.order) }
    }

    /// Encodes `value` at absolute byte `index`, in this view's order.
    ///
    /// # Panics
    ///
    /// Panics if `index + T::SIZE > limit()`.
    pub fn put_value<T: Element>(&mut self, index: usize, value: T) {
        self.check_index(index, T::SIZE);
        unsafe { raw::write(self.base + index, value, self.order) }
    }

    /// All `capacity()` bytes of the view.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { raw::bytes(self.base, self.window.capacity()) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { raw::bytes_mut(self.base, self.window.capacity()) }
    }

    /// Copies out the bytes in `[position, limit)`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes()[self.window.position()..self.window.limit()].to_vec()
    }

    /// A big-endian view over `[position, limit)` with its own window.
    pub fn slice(&mut self) -> ByteView<'_> {
        unsafe {
            ByteView::from_raw_parts(
                self.base + self.window.position(),
                self.window.remaining(),
                ByteOrder::BigEndian,
            )
        }
    }

    /// Reinterprets `[position, limit)` as elements of `T` in this view's order.
    ///
    /// Trailing bytes that do not form a whole element are not part of the result.
    pub fn as_typed<T: Element>(self) -> TypedView<'a, T> {
        let base = self.base + self.window.position();
        let count = self.window.remaining() / T::SIZE;
        unsafe { TypedView::from_raw_parts(base, count, self.order) }
    }

    #[inline]
    fn check_index(&self, index: usize, size: usize) {
        assert!(
            index.checked_add(size).is_some_and(|end| end <= self.window.limit()),
            "index {index} (+{size}) out of bounds for limit {}",
            self.window.limit()
        );
    }
}

impl WindowMut for ByteView<'_> {
    #[inline]
    fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

impl Buffer for ByteView<'_> {
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
        BufferKind::View
    }

    #[inline]
    fn base_address(&self) -> Option<NativeAddress> {
        Some(self.base)
    }
}

impl std::fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteView")
            .field("base", &self.base)
            .field("window", &self.window)
            .field("order", &self.order)
            .finish()
    }
}

/// A buffer of `T` elements over memory owned elsewhere.
///
/// Capacity, position and limit count elements, not bytes.
pub struct TypedView<'a, T: Element> {
    base: NativeAddress,
    window: Window,
    order: ByteOrder,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T: Element> TypedView<'a, T> {
    /// # Safety
    ///
    /// `[base, base + count * T::SIZE)` must be valid for reads and writes for `'a`.
    /// No alignment is required.
    pub(crate) unsafe fn from_raw_parts(
        base: NativeAddress,
        count: usize,
        order: ByteOrder,
    ) -> TypedView<'a, T> {
        TypedView {
            base,
            window: Window::new(count),
            order,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn address(&self) -> NativeAddress {
        self.base
    }

    /// Element at absolute `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    pub fn get(&self, index: usize) -> T {
        self.check_index(index);
        unsafe { raw::read(self.base + index * T::SIZE, self.order) }
    }

    /// # Panics
    ///
    /// Panics if `index >= limit()`.
    pub fn put(&mut self, index: usize, value: T) {
        self.check_index(index);
        unsafe { raw::write(self.base + index * T::SIZE, value, self.order) }
    }

    /// Elements in `[position, limit)`.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (self.window.position()..self.window.limit()).map(|i| self.get(i))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    #[inline]
    fn check_index(&self, index: usize) {
        assert!(
            index < self.window.limit(),
            "index {index} out of bounds for limit {}",
            self.window.limit()
        );
    }
}

impl<T: Element> WindowMut for TypedView<'_, T> {
    #[inline]
    fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

impl<T: Element> Buffer for TypedView<'_, T> {
    #[inline]
    fn window(&self) -> &Window {
        &self.window
    }

    #[inline]
    fn element_size(&self) -> usize {
        T::SIZE
    }

    #[inline]
    fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline]
    fn kind(&self) -> BufferKind {
        BufferKind::View
    }

    #[inline]
    fn base_address(&self) -> Option<NativeAddress> {
        Some(self.base)
    }
}

impl<T: Element> std::fmt::Debug for TypedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedView")
            .field("element", &std::any::type_name::<T>())
            .field("base", &self.base)
            .field("window", &self.window)
            .field("order", &self.order)
            .finish()
    }
}
