use crate::allocator::{HeapAllocator, SlotAllocator};
use crate::cursor::{Cursor, Mutable, ReadOnly, Reverse};
use crate::error::CapVecError;
use crate::growth;
use crate::iter::{Iter, RevIter};
use alloc::alloc::{handle_alloc_error, Layout};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem;
use core::ops::{Deref, DerefMut, Index, IndexMut};
use core::ptr::{self, NonNull};
use core::slice;
use tracing::{debug, trace};

/// A contiguous, growable vector whose capacity is managed explicitly.
///
/// Slots `[0, len)` hold live values, slots `[len, capacity)` are allocated but
/// uninitialized. The buffer is obtained from `A` and every element enters and
/// leaves it through `A::construct` / `A::destroy`.
///
/// How much the buffer grows depends on which operation asked for room; see the
/// [growth policy](crate#growth-policy).
pub struct CapVec<T, A: SlotAllocator<T> = HeapAllocator> {
    pub(crate) storage: Option<NonNull<T>>,
    pub(crate) size: usize,
    pub(crate) capacity: usize,
    /// Target of the most recent `resize`, consulted only by `resize`.
    pub(crate) growth_mark: usize,
    pub(crate) allocator: A,
    _owns: PhantomData<T>,
}

// SAFETY: `CapVec` uniquely owns its buffer, like `Vec`.
#[allow(unsafe_code)]
unsafe impl<T: Send, A: SlotAllocator<T> + Send> Send for CapVec<T, A> {}
// SAFETY: shared access only hands out shared references to elements.
#[allow(unsafe_code)]
unsafe impl<T: Sync, A: SlotAllocator<T> + Sync> Sync for CapVec<T, A> {}

/// Turns a capacity failure into the panic or abort `Vec` would produce.
///
/// Used by trait impls (`Clone`, `FromIterator`, `Extend`) that cannot return errors.
pub(crate) fn capacity_overflow<T>(err: CapVecError) -> ! {
    match err {
        CapVecError::AllocationFailed { requested } => {
            handle_alloc_error(Layout::array::<T>(requested).unwrap_or(Layout::new::<T>()))
        }
        err => panic!("capacity overflow: {err}"),
    }
}

impl<T> CapVec<T> {
    /// Creates an empty vector on the global heap. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(HeapAllocator)
    }

    /// Creates a vector holding `n` clones of `value`.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if `n` exceeds `max_size()`.
    pub fn from_elem(n: usize, value: T) -> Result<Self, CapVecError>
    where
        T: Clone,
    {
        Self::from_elem_in(n, value, HeapAllocator)
    }
}

impl<T, A: SlotAllocator<T>> CapVec<T, A> {
    /// Creates an empty vector that will allocate from `allocator`.
    pub const fn new_in(allocator: A) -> Self {
        Self {
            storage: None,
            size: 0,
            capacity: 0,
            growth_mark: 0,
            allocator,
            _owns: PhantomData,
        }
    }

    /// Fill constructor: `n` clones of `value`, capacity exactly `n`.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if `n` exceeds `max_size()`.
    pub fn from_elem_in(n: usize, value: T, allocator: A) -> Result<Self, CapVecError>
    where
        T: Clone,
    {
        let mut vec = Self::new_in(allocator);
        vec.assign(n, value)?;
        Ok(vec)
    }

    /// Range constructor: the items of `iter`, capacity exactly their count.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the count exceeds `max_size()`.
    pub fn from_iter_in<I>(iter: I, allocator: A) -> Result<Self, CapVecError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut vec = Self::new_in(allocator);
        vec.assign_iter(iter)?;
        Ok(vec)
    }

    // Buffer engine

    fn base(&self) -> NonNull<T> {
        self.storage.unwrap_or(NonNull::dangling())
    }

    /// Pointer to slot `offset`.
    ///
    /// # Safety
    ///
    /// `offset` must be at most `capacity`.
    #[allow(unsafe_code)]
    pub(crate) unsafe fn slot(&self, offset: usize) -> NonNull<T> {
        // SAFETY: offset stays inside (or one past) the allocation
        unsafe { self.base().add(offset) }
    }

    pub(crate) fn length_error(&self, requested: usize) -> CapVecError {
        CapVecError::LengthError {
            requested,
            max: self.max_size(),
        }
    }

    /// `len + extra`, or a length error if that overflows.
    pub(crate) fn required(&self, extra: usize) -> Result<usize, CapVecError> {
        self.size
            .checked_add(extra)
            .ok_or_else(|| self.length_error(usize::MAX))
    }

    /// Requests storage for `n` slots from the allocator.
    fn allocate(&self, n: usize) -> Result<NonNull<T>, CapVecError> {
        if n > self.max_size() {
            return Err(self.length_error(n));
        }
        self.allocator.allocate(n)
    }

    /// Moves the live elements into a fresh buffer of `new_capacity` slots.
    ///
    /// This is the only place the buffer address changes, so every outstanding
    /// cursor is invalidated. Elements are relocated bitwise: their values now
    /// live in the new buffer and the old slots are released without `destroy`.
    /// The fallible step is the allocation, which happens before anything moves,
    /// so a failed reallocation leaves the vector untouched.
    #[allow(unsafe_code)]
    pub(crate) fn reallocate(&mut self, new_capacity: usize) -> Result<(), CapVecError> {
        debug_assert!(new_capacity >= self.size);
        let fresh = self.allocate(new_capacity)?;

        if let Some(old) = self.storage {
            // SAFETY: both buffers hold at least `size` slots and do not overlap
            unsafe {
                ptr::copy_nonoverlapping(old.as_ptr(), fresh.as_ptr(), self.size);
                self.allocator.deallocate(old, self.capacity);
            }
        }

        debug!(
            size = self.size,
            from = self.capacity,
            to = new_capacity,
            "reallocated buffer"
        );
        self.storage = Some(fresh);
        self.capacity = new_capacity;
        Ok(())
    }

    /// Destroys every live element and releases the buffer.
    #[allow(unsafe_code)]
    fn deallocate(&mut self) {
        self.clear();
        if let Some(ptr) = self.storage.take() {
            // SAFETY: ptr came from `allocate(capacity)` and holds no live values
            unsafe { self.allocator.deallocate(ptr, self.capacity) };
            trace!(capacity = self.capacity, "released buffer");
        }
        self.capacity = 0;
    }

    /// Reallocates to `proposed` if `required` slots do not fit.
    ///
    /// `proposed` is the growth policy's answer; `None` means it overflowed.
    pub(crate) fn grow(
        &mut self,
        required: usize,
        proposed: Option<usize>,
    ) -> Result<(), CapVecError> {
        if required <= self.capacity {
            return Ok(());
        }
        let new_capacity = proposed.ok_or_else(|| self.length_error(required))?;
        self.reallocate(new_capacity)
    }

    /// Destroys the elements in `[from, to)`.
    ///
    /// Callers must already have moved `size` out of the range.
    #[allow(unsafe_code)]
    pub(crate) fn destroy_range(&mut self, from: usize, to: usize) {
        debug_assert!(self.size <= from);
        for offset in from..to {
            // SAFETY: offset < old size, so the slot is live and no longer counted
            unsafe { self.allocator.destroy(self.slot(offset)) };
        }
    }

    // Capacity

    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest number of elements the allocator can hold in one buffer.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.allocator.max_size()
    }

    /// Ensures the capacity is at least `n`, allocating exactly `n` slots if not.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if `n` exceeds `max_size()`, even when
    /// the current capacity would already suffice.
    pub fn reserve(&mut self, n: usize) -> Result<(), CapVecError> {
        if n > self.max_size() {
            return Err(self.length_error(n));
        }
        if self.capacity >= n {
            return Ok(());
        }
        self.reallocate(n)
    }

    /// Resizes to `n` elements, filling new slots with clones of `value`.
    ///
    /// When `n` exceeds the capacity, the new capacity is chosen relative to the
    /// previous `resize` target, not to the current capacity: `n` if it is not
    /// above that target or more than twice it, otherwise twice the target. Every
    /// successful call records `n` as the new target.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the new capacity exceeds `max_size()`.
    #[allow(unsafe_code)]
    pub fn resize(&mut self, n: usize, value: T) -> Result<(), CapVecError>
    where
        T: Clone,
    {
        if n < self.size {
            let old = mem::replace(&mut self.size, n);
            self.destroy_range(n, old);
        } else {
            if n > self.capacity {
                self.reallocate(growth::for_resize(n, self.growth_mark))?;
            }
            while self.size < n {
                // SAFETY: size < n <= capacity, slot is uninitialized
                unsafe {
                    self.allocator
                        .construct(self.slot(self.size), value.clone());
                }
                self.size += 1;
            }
        }
        self.growth_mark = n;
        Ok(())
    }

    // Element access

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::OutOfRange` if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, CapVecError> {
        let size = self.size;
        self.as_slice()
            .get(index)
            .ok_or(CapVecError::OutOfRange { index, size })
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::OutOfRange` if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, CapVecError> {
        let size = self.size;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(CapVecError::OutOfRange { index, size })
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Raw pointer to the buffer; null while nothing is allocated.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.storage.map_or(ptr::null(), |ptr| ptr.as_ptr().cast_const())
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    #[allow(unsafe_code)]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, size)` are live; the base is dangling only when size is 0
        unsafe { slice::from_raw_parts(self.base().as_ptr(), self.size) }
    }

    #[allow(unsafe_code)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusivity
        unsafe { slice::from_raw_parts_mut(self.base().as_ptr(), self.size) }
    }

    /// Element under `cursor`, `None` if it is at or past the end.
    #[must_use]
    pub fn get_at<M>(&self, cursor: Cursor<T, M>) -> Option<&T> {
        self.as_slice().get(cursor.offset())
    }

    pub fn get_at_mut(&mut self, cursor: Cursor<T, Mutable>) -> Option<&mut T> {
        self.as_mut_slice().get_mut(cursor.offset())
    }

    /// The allocation strategy in use.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    // Cursors

    #[must_use]
    pub fn begin(&self) -> Cursor<T, Mutable> {
        Cursor::at(0)
    }

    #[must_use]
    pub fn end(&self) -> Cursor<T, Mutable> {
        Cursor::at(self.size)
    }

    #[must_use]
    pub fn rbegin(&self) -> Reverse<Cursor<T, Mutable>> {
        Reverse::new(self.end())
    }

    #[must_use]
    pub fn rend(&self) -> Reverse<Cursor<T, Mutable>> {
        Reverse::new(self.begin())
    }

    #[must_use]
    pub fn cbegin(&self) -> Cursor<T, ReadOnly> {
        Cursor::at(0)
    }

    #[must_use]
    pub fn cend(&self) -> Cursor<T, ReadOnly> {
        Cursor::at(self.size)
    }

    #[must_use]
    pub fn crbegin(&self) -> Reverse<Cursor<T, ReadOnly>> {
        Reverse::new(self.cend())
    }

    #[must_use]
    pub fn crend(&self) -> Reverse<Cursor<T, ReadOnly>> {
        Reverse::new(self.cbegin())
    }

    /// Iterates over `[first, last)`.
    ///
    /// # Panics
    ///
    /// Panics if `first > last` or `last` is past the end.
    #[must_use]
    pub fn range<M, N>(&self, first: Cursor<T, M>, last: Cursor<T, N>) -> Iter<'_, T> {
        assert!(
            first.offset() <= last.offset() && last.offset() <= self.size,
            "range {}..{} out of bounds for vector of length {}",
            first.offset(),
            last.offset(),
            self.size
        );
        Iter::new(self.as_slice(), first.read_only(), last.read_only())
    }

    /// Iterates from `rbegin()` to `rend()`.
    #[must_use]
    pub fn iter_rev(&self) -> RevIter<'_, T> {
        RevIter::new(self.as_slice(), self.crbegin(), self.crend())
    }

    /// Exchanges buffers with `other` in O(1).
    ///
    /// The allocators travel with their buffers; each vector keeps its own
    /// `resize` target.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.storage, &mut other.storage);
        mem::swap(&mut self.size, &mut other.size);
        mem::swap(&mut self.capacity, &mut other.capacity);
        mem::swap(&mut self.allocator, &mut other.allocator);
    }
}

/// Exchanges the contents of two vectors.
pub fn swap<T, A: SlotAllocator<T>>(x: &mut CapVec<T, A>, y: &mut CapVec<T, A>) {
    x.swap(y);
}

impl<T, A: SlotAllocator<T>> Drop for CapVec<T, A> {
    fn drop(&mut self) {
        self.deallocate();
    }
}

impl<T, A: SlotAllocator<T> + Default> Default for CapVec<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

/// Copies through `assign`, so the clone's capacity equals the source length.
impl<T: Clone, A: SlotAllocator<T> + Clone> Clone for CapVec<T, A> {
    fn clone(&self) -> Self {
        let mut vec = Self::new_in(self.allocator.clone());
        vec.clone_from(self);
        vec
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.assign_slice(source.as_slice()) {
            capacity_overflow::<T>(err);
        }
    }
}

impl<T, A: SlotAllocator<T>> Deref for CapVec<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator<T>> DerefMut for CapVec<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: SlotAllocator<T>> AsRef<[T]> for CapVec<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator<T>> Index<usize> for CapVec<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T, A: SlotAllocator<T>> IndexMut<usize> for CapVec<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T, M, A: SlotAllocator<T>> Index<Cursor<T, M>> for CapVec<T, A> {
    type Output = T;

    fn index(&self, cursor: Cursor<T, M>) -> &T {
        &self.as_slice()[cursor.offset()]
    }
}

impl<T, A: SlotAllocator<T>> IndexMut<Cursor<T, Mutable>> for CapVec<T, A> {
    fn index_mut(&mut self, cursor: Cursor<T, Mutable>) -> &mut T {
        &mut self.as_mut_slice()[cursor.offset()]
    }
}

impl<T, M, A: SlotAllocator<T>> Index<Reverse<Cursor<T, M>>> for CapVec<T, A> {
    type Output = T;

    fn index(&self, cursor: Reverse<Cursor<T, M>>) -> &T {
        &self.as_slice()[cursor.current().offset()]
    }
}

impl<T, A: SlotAllocator<T>> IndexMut<Reverse<Cursor<T, Mutable>>> for CapVec<T, A> {
    fn index_mut(&mut self, cursor: Reverse<Cursor<T, Mutable>>) -> &mut T {
        &mut self.as_mut_slice()[cursor.current().offset()]
    }
}

impl<T: fmt::Debug, A: SlotAllocator<T>> fmt::Debug for CapVec<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, U, A, B> PartialEq<CapVec<U, B>> for CapVec<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator<T>,
    B: SlotAllocator<U>,
{
    fn eq(&self, other: &CapVec<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, A: SlotAllocator<T>, const N: usize> PartialEq<[U; N]> for CapVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: SlotAllocator<T>> PartialEq<&[U]> for CapVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: Eq, A: SlotAllocator<T>> Eq for CapVec<T, A> {}

/// Lexicographic, element by element, then by length.
impl<T: PartialOrd, A: SlotAllocator<T>> PartialOrd for CapVec<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, A: SlotAllocator<T>> Ord for CapVec<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, A: SlotAllocator<T>> Hash for CapVec<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> FromIterator<T> for CapVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_in(iter, HeapAllocator).unwrap_or_else(|err| capacity_overflow::<T>(err))
    }
}

impl<T, const N: usize> From<[T; N]> for CapVec<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<T, A: SlotAllocator<T>> Extend<T> for CapVec<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(err) = self.push_back(value) {
                capacity_overflow::<T>(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_empty_vector_owns_no_buffer() {
        let vec: CapVec<u32> = CapVec::new();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);
        assert!(vec.as_ptr().is_null());
        assert!(vec.storage.is_none());
        assert!(vec.as_slice().is_empty());
    }

    #[test]
    fn test_reallocate_preserves_order_and_moves_buffer() {
        let mut vec = CapVec::from([1, 2, 3]);
        let before = vec.as_ptr();
        vec.reallocate(10).unwrap();
        assert_eq!(vec.capacity(), 10);
        assert_eq!(vec, [1, 2, 3]);
        assert_ne!(vec.as_ptr(), before);
    }

    #[test]
    fn test_deallocate_resets_storage() {
        let mut vec = CapVec::from([1, 2, 3]);
        vec.deallocate();
        assert_eq!(vec.len(), 0);
        assert_eq!(vec.capacity(), 0);
        assert!(vec.as_ptr().is_null());
    }

    #[test]
    fn test_resize_records_target_even_when_shrinking() {
        let mut vec: CapVec<u8> = CapVec::new();
        vec.resize(4, 0).unwrap();
        assert_eq!(vec.growth_mark, 4);
        vec.resize(1, 0).unwrap();
        assert_eq!(vec.growth_mark, 1);
        assert_eq!(vec.capacity(), 4);
    }

    #[test]
    fn test_failed_reserve_leaves_vector_intact() {
        let mut vec = CapVec::from([1u64, 2]);
        let max = vec.max_size();
        assert!(vec.reserve(max + 1).is_err());
        assert_eq!(vec, [1, 2]);
        assert_eq!(vec.capacity(), 2);
    }

    #[traced_test]
    #[test]
    fn test_reallocation_is_logged() {
        let mut vec = CapVec::new();
        vec.push_back(1u8).unwrap();
        assert!(logs_contain("reallocated buffer"));
    }
}
