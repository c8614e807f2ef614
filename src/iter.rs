use crate::allocator::{HeapAllocator, SlotAllocator};
use crate::core::CapVec;
use crate::cursor::{Cursor, ReadOnly, Reverse};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

/// Iterator over the elements between two cursors.
///
/// This iterator implements `Clone`.
pub struct Iter<'a, T> {
    items: &'a [T],
    front: Cursor<T, ReadOnly>,
    back: Cursor<T, ReadOnly>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(
        items: &'a [T],
        front: Cursor<T, ReadOnly>,
        back: Cursor<T, ReadOnly>,
    ) -> Self {
        Self { items, front, back }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let item = self.items.get(self.front.offset())?;
        self.front.inc();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.offset() - self.front.offset();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back.dec();
        self.items.get(self.back.offset())
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Reverse iterator over a `CapVec`, walking `rbegin()` to `rend()`.
///
/// This iterator implements `Clone`.
pub struct RevIter<'a, T> {
    items: &'a [T],
    position: Reverse<Cursor<T, ReadOnly>>,
    end: Reverse<Cursor<T, ReadOnly>>,
}

impl<'a, T> RevIter<'a, T> {
    pub(crate) fn new(
        items: &'a [T],
        position: Reverse<Cursor<T, ReadOnly>>,
        end: Reverse<Cursor<T, ReadOnly>>,
    ) -> Self {
        Self {
            items,
            position,
            end,
        }
    }
}

impl<T> Clone for RevIter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for RevIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position == self.end {
            return None;
        }
        let item = self.items.get(self.position.current().offset())?;
        self.position.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.position).unsigned_abs();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for RevIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.position == self.end {
            return None;
        }
        self.end.retreat();
        self.items.get(self.end.current().offset())
    }
}

impl<T> ExactSizeIterator for RevIter<'_, T> {}

impl<T> FusedIterator for RevIter<'_, T> {}

impl<'a, T, A: SlotAllocator<T>> IntoIterator for &'a CapVec<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.range(self.cbegin(), self.cend())
    }
}

/// Owning iterator that moves elements out of a `CapVec`.
///
/// Elements not yielded are destroyed through the allocator when the iterator
/// is dropped, and the buffer is released before the allocator itself drops.
pub struct IntoIter<T, A: SlotAllocator<T> = HeapAllocator> {
    storage: Option<NonNull<T>>,
    capacity: usize,
    front: usize,
    back: usize,
    allocator: A,
    _owns: PhantomData<T>,
}

// SAFETY: the iterator uniquely owns the remaining elements and the buffer
#[allow(unsafe_code)]
unsafe impl<T: Send, A: SlotAllocator<T> + Send> Send for IntoIter<T, A> {}
// SAFETY: no shared access to elements is exposed
#[allow(unsafe_code)]
unsafe impl<T: Sync, A: SlotAllocator<T> + Sync> Sync for IntoIter<T, A> {}

impl<T, A: SlotAllocator<T>> IntoIter<T, A> {
    #[allow(unsafe_code)]
    fn slot(&self, offset: usize) -> Option<NonNull<T>> {
        // SAFETY: callers only pass offsets in `[front, back)`, inside the allocation
        self.storage.map(|base| unsafe { base.add(offset) })
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.back - self.front
    }
}

impl<T, A: SlotAllocator<T>> Iterator for IntoIter<T, A> {
    type Item = T;

    #[allow(unsafe_code)]
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let slot = self.slot(self.front)?;
        self.front += 1;
        // SAFETY: the slot was live and is no longer in `[front, back)`
        Some(unsafe { slot.as_ptr().read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl<T, A: SlotAllocator<T>> DoubleEndedIterator for IntoIter<T, A> {
    #[allow(unsafe_code)]
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        let slot = self.slot(self.back)?;
        // SAFETY: the slot was live and is no longer in `[front, back)`
        Some(unsafe { slot.as_ptr().read() })
    }
}

impl<T, A: SlotAllocator<T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: SlotAllocator<T>> FusedIterator for IntoIter<T, A> {}

impl<T, A: SlotAllocator<T>> Drop for IntoIter<T, A> {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        while self.front < self.back {
            let offset = self.front;
            self.front += 1;
            if let Some(slot) = self.slot(offset) {
                // SAFETY: the slot is live and is not yielded again
                unsafe { self.allocator.destroy(slot) };
            }
        }
        if let Some(base) = self.storage.take() {
            // SAFETY: the buffer came from this allocator and holds no live values
            unsafe { self.allocator.deallocate(base, self.capacity) };
        }
    }
}

impl<T, A: SlotAllocator<T>> IntoIterator for CapVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    #[allow(unsafe_code)]
    fn into_iter(self) -> Self::IntoIter {
        let vec = ManuallyDrop::new(self);
        // SAFETY: `vec` is never dropped, so the allocator is moved out exactly once
        let allocator = unsafe { ptr::read(&vec.allocator) };
        IntoIter {
            storage: vec.storage,
            capacity: vec.capacity,
            front: 0,
            back: vec.size,
            allocator,
            _owns: PhantomData,
        }
    }
}
