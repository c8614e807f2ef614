//! Modifiers: assign, append/remove at the back, insert, erase, clear.
//!
//! Every operation that opens or closes a gap first shrinks `size` to the gap's
//! start, so a panic in a clone or a destructor leaks the tail instead of
//! dropping a slot twice.

use crate::allocator::SlotAllocator;
use crate::core::CapVec;
use crate::cursor::{Cursor, Mutable};
use crate::error::CapVecError;
use crate::growth;
use core::iter;
use core::mem::{self, ManuallyDrop};
use core::ptr::{self, NonNull};

impl<T, A: SlotAllocator<T>> CapVec<T, A> {
    /// Replaces the contents with `n` clones of `value`.
    ///
    /// Capacity becomes at least `n` (exactly `n` if it had to grow).
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if `n` exceeds `max_size()`.
    pub fn assign(&mut self, n: usize, value: T) -> Result<(), CapVecError>
    where
        T: Clone,
    {
        self.reserve(n)?;
        self.overwrite(n, iter::repeat(value));
        Ok(())
    }

    /// Replaces the contents with clones of `items`.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if `items.len()` exceeds `max_size()`.
    pub fn assign_slice(&mut self, items: &[T]) -> Result<(), CapVecError>
    where
        T: Clone,
    {
        self.reserve(items.len())?;
        self.overwrite(items.len(), items.iter().cloned());
        Ok(())
    }

    /// Replaces the contents with the items of `iter`.
    ///
    /// The input is consumed exactly once: it is staged in a buffer from this
    /// vector's allocator to learn its length, then the staged values are moved in.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the item count exceeds `max_size()`.
    #[allow(unsafe_code)]
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<(), CapVecError>
    where
        I: IntoIterator<Item = T>,
    {
        let staged = self.stage(iter)?;
        let target = staged.len;
        if let Err(err) = self.reserve(target) {
            self.discard(staged);
            return Err(err);
        }

        self.clear();
        // SAFETY: capacity covers `target`, the vector is empty, and the staged
        // values are relocated exactly once
        unsafe {
            ptr::copy_nonoverlapping(staged.base().as_ptr(), self.slot(0).as_ptr(), target);
        }
        self.size = target;
        self.release(staged);
        Ok(())
    }

    /// Makes the vector hold the first `target` items of `values`.
    ///
    /// Live slots below `target` are destroyed and rebuilt in place, surplus live
    /// slots are destroyed, missing slots are constructed. Capacity must already
    /// cover `target`.
    #[allow(unsafe_code)]
    fn overwrite(&mut self, target: usize, values: impl IntoIterator<Item = T>) {
        debug_assert!(target <= self.capacity);
        let mut values = values.into_iter();
        let live = self.size.min(target);
        for (offset, value) in (0..live).zip(&mut values) {
            // SAFETY: offset < size, the slot is live and is rebuilt immediately
            unsafe {
                let slot = self.slot(offset);
                self.allocator.destroy(slot);
                self.allocator.construct(slot, value);
            }
        }

        if target < self.size {
            let old = mem::replace(&mut self.size, target);
            self.destroy_range(target, old);
        } else {
            let missing = target - self.size;
            for value in values.take(missing) {
                // SAFETY: size < target <= capacity, the slot is uninitialized
                unsafe { self.allocator.construct(self.slot(self.size), value) };
                self.size += 1;
            }
        }
    }

    /// Appends `value`, doubling the capacity (or allocating one slot) when full.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the doubled capacity exceeds `max_size()`.
    #[allow(unsafe_code)]
    pub fn push_back(&mut self, value: T) -> Result<(), CapVecError> {
        let required = self.required(1)?;
        self.grow(required, growth::for_append(self.capacity))?;
        // SAFETY: size < capacity after growing, the slot is uninitialized
        unsafe { self.allocator.construct(self.slot(self.size), value) };
        self.size += 1;
        Ok(())
    }

    /// Destroys the last element. Does nothing on an empty vector.
    pub fn pop_back(&mut self) {
        if self.size > 0 {
            self.erase(self.end() - 1);
        }
    }

    /// Moves the last element out.
    #[allow(unsafe_code)]
    pub fn pop(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        // SAFETY: the slot was live and is no longer counted
        Some(unsafe { self.slot(self.size).as_ptr().read() })
    }

    fn check_position<M>(&self, position: Cursor<T, M>) -> usize {
        let id = position.offset();
        assert!(
            id <= self.size,
            "insert position {id} out of bounds for vector of length {}",
            self.size
        );
        id
    }

    /// Shifts `[id, size)` right by `count` slots and returns the old size.
    ///
    /// On return `size == id`; the caller constructs `[id, id + count)` and then
    /// sets `size` to `old + count`. Capacity must already cover `old + count`.
    #[allow(unsafe_code)]
    fn open_gap(&mut self, id: usize, count: usize) -> usize {
        let old = mem::replace(&mut self.size, id);
        // SAFETY: source and destination lie within capacity; `ptr::copy` handles overlap
        unsafe {
            ptr::copy(
                self.slot(id).as_ptr(),
                self.slot(id + count).as_ptr(),
                old - id,
            );
        }
        old
    }

    /// Inserts `value` before `position` and returns a cursor to it.
    ///
    /// Grows to exactly `len() + 1` if full. Cursors at or after `position` are
    /// invalidated (all of them if the buffer moved).
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the new capacity exceeds `max_size()`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past the end.
    #[allow(unsafe_code)]
    pub fn insert<M>(
        &mut self,
        position: Cursor<T, M>,
        value: T,
    ) -> Result<Cursor<T, Mutable>, CapVecError> {
        let id = self.check_position(position);
        let required = self.required(1)?;
        self.grow(required, growth::for_insert_one(self.size))?;

        let old = self.open_gap(id, 1);
        // SAFETY: the gap slot was vacated by `open_gap`
        unsafe { self.allocator.construct(self.slot(id), value) };
        self.size = old + 1;
        Ok(Cursor::at(id))
    }

    /// Inserts `n` clones of `value` before `position`.
    ///
    /// When growing, the new capacity is `len() * 2` if that exceeds
    /// `len() + n`, otherwise exactly `len() + n`.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the new capacity exceeds `max_size()`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past the end.
    #[allow(unsafe_code)]
    pub fn insert_n<M>(
        &mut self,
        position: Cursor<T, M>,
        n: usize,
        value: T,
    ) -> Result<Cursor<T, Mutable>, CapVecError>
    where
        T: Clone,
    {
        let id = self.check_position(position);
        if n == 0 {
            return Ok(Cursor::at(id));
        }
        let required = self.required(n)?;
        self.grow(required, growth::for_insert_n(self.size, n))?;

        let old = self.open_gap(id, n);
        for offset in id..id + n {
            // SAFETY: the gap slots were vacated by `open_gap`
            unsafe { self.allocator.construct(self.slot(offset), value.clone()) };
        }
        self.size = old + n;
        Ok(Cursor::at(id))
    }

    /// Inserts the items of `iter` before `position`, keeping their order.
    ///
    /// The input is consumed exactly once. When growing, the new capacity is
    /// `len() * 2 + count`.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if the new capacity exceeds `max_size()`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past the end.
    #[allow(unsafe_code)]
    pub fn insert_iter<M, I>(
        &mut self,
        position: Cursor<T, M>,
        iter: I,
    ) -> Result<Cursor<T, Mutable>, CapVecError>
    where
        I: IntoIterator<Item = T>,
    {
        let id = self.check_position(position);
        let staged = self.stage(iter)?;
        let count = staged.len;
        let grown = self
            .required(count)
            .and_then(|required| self.grow(required, growth::for_insert_range(self.size, count)));
        if let Err(err) = grown {
            self.discard(staged);
            return Err(err);
        }

        let old = self.open_gap(id, count);
        // SAFETY: the gap slots were vacated by `open_gap` and the staged values
        // are relocated exactly once
        unsafe {
            ptr::copy_nonoverlapping(staged.base().as_ptr(), self.slot(id).as_ptr(), count);
        }
        self.size = old + count;
        self.release(staged);
        Ok(Cursor::at(id))
    }

    /// Removes the element at `position`; see [`erase_range`](Self::erase_range).
    pub fn erase<M>(&mut self, position: Cursor<T, M>) -> Cursor<T, M> {
        self.erase_range(position, position + 1)
    }

    /// Removes `[first, last)` and closes the gap.
    ///
    /// Returns `first`, which now denotes the element that followed the erased
    /// range (or the end). Nothing happens when the range is empty or `first` is
    /// the end.
    ///
    /// # Panics
    ///
    /// Panics if `first > last` or `last` is past the end.
    #[allow(unsafe_code)]
    pub fn erase_range<M>(&mut self, first: Cursor<T, M>, last: Cursor<T, M>) -> Cursor<T, M> {
        if first == last || first.offset() == self.size {
            return first;
        }
        assert!(
            first < last && last.offset() <= self.size,
            "erase range {}..{} out of bounds for vector of length {}",
            first.offset(),
            last.offset(),
            self.size
        );

        let begin_offset = first.offset();
        let removed_count = last.offset() - begin_offset;
        let tail_count = self.size - last.offset();

        let old = mem::replace(&mut self.size, begin_offset);
        self.destroy_range(begin_offset, begin_offset + removed_count);
        // SAFETY: the tail is live and moves into the slots just destroyed
        unsafe {
            ptr::copy(
                self.slot(last.offset()).as_ptr(),
                self.slot(begin_offset).as_ptr(),
                tail_count,
            );
        }
        self.size = old - removed_count;
        first
    }

    /// Destroys every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        let old = mem::replace(&mut self.size, 0);
        self.destroy_range(0, old);
    }
}

/// Values drained from a single-pass input, held in a buffer from the owning
/// vector's allocator but no longer tied to a borrow of it.
///
/// Must be handed back through `release` (after moving the values out) or
/// `discard`; dropping it leaks.
struct Staged<T> {
    storage: Option<NonNull<T>>,
    len: usize,
    capacity: usize,
}

impl<T> Staged<T> {
    fn base(&self) -> NonNull<T> {
        self.storage.unwrap_or(NonNull::dangling())
    }
}

impl<T, A: SlotAllocator<T>> CapVec<T, A> {
    /// Drains `iter` into a buffer obtained from `self.allocator`.
    fn stage<I>(&self, iter: I) -> Result<Staged<T>, CapVecError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut staging = CapVec::new_in(&self.allocator);
        for value in iter {
            staging.push_back(value)?;
        }
        let staging = ManuallyDrop::new(staging);
        Ok(Staged {
            storage: staging.storage,
            len: staging.size,
            capacity: staging.capacity,
        })
    }

    /// Releases a staging buffer whose values were all moved out.
    #[allow(unsafe_code)]
    fn release(&self, staged: Staged<T>) {
        if let Some(ptr) = staged.storage {
            // SAFETY: the buffer came from `allocate(capacity)` on this allocator
            // and holds no live values
            unsafe { self.allocator.deallocate(ptr, staged.capacity) };
        }
    }

    /// Destroys the staged values, then releases their buffer.
    #[allow(unsafe_code)]
    fn discard(&self, staged: Staged<T>) {
        for offset in 0..staged.len {
            // SAFETY: slots below `len` hold live staged values
            unsafe { self.allocator.destroy(staged.base().add(offset)) };
        }
        self.release(staged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_shorter_reuses_buffer() {
        let mut vec = CapVec::new();
        vec.assign(5, 9).unwrap();
        let ptr = vec.as_ptr();
        vec.assign(2, 3).unwrap();
        assert_eq!(vec, [3, 3]);
        assert_eq!(vec.capacity(), 5);
        assert_eq!(vec.as_ptr(), ptr);
    }

    #[test]
    fn test_open_gap_then_fill() {
        let mut vec = CapVec::from([1, 2, 3]);
        vec.reserve(5).unwrap();
        let old = vec.open_gap(1, 2);
        assert_eq!(old, 3);
        assert_eq!(vec.len(), 1);
        unsafe {
            vec.allocator.construct(vec.slot(1), 8);
            vec.allocator.construct(vec.slot(2), 9);
        }
        vec.size = old + 2;
        assert_eq!(vec, [1, 8, 9, 2, 3]);
    }

    #[test]
    fn test_insert_into_empty() {
        let mut vec = CapVec::new();
        let at = vec.insert(vec.begin(), 5).unwrap();
        assert_eq!(at, vec.begin());
        assert_eq!(vec, [5]);
        assert_eq!(vec.capacity(), 1);
    }

    #[test]
    fn test_pop_moves_out_last() {
        let mut vec = CapVec::from([1, 2]);
        assert_eq!(vec.pop(), Some(2));
        assert_eq!(vec.pop(), Some(1));
        assert_eq!(vec.pop(), None);
        assert_eq!(vec.capacity(), 2);
    }

    #[test]
    #[should_panic(expected = "insert position 3 out of bounds for vector of length 2")]
    fn test_insert_past_end_panics() {
        let mut vec = CapVec::from([1, 2]);
        let _ = vec.insert(vec.begin() + 3, 0);
    }

    #[test]
    #[should_panic(expected = "erase range 1..5 out of bounds for vector of length 2")]
    fn test_erase_past_end_panics() {
        let mut vec = CapVec::from([1, 2]);
        vec.erase_range(vec.begin() + 1, vec.begin() + 5);
    }
}
