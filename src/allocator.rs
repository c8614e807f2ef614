//! The allocation boundary between `CapVec` and raw memory.
//!
//! A [`SlotAllocator`] hands out uninitialized slots and is the only place where
//! values are written into or dropped from them. `CapVec` never assumes zeroed or
//! default-constructed memory: every live slot went through [`SlotAllocator::construct`]
//! and leaves through [`SlotAllocator::destroy`] (or is moved out).

use crate::error::CapVecError;
use alloc::alloc::{alloc, dealloc, Layout};
use core::mem;
use core::ptr::{self, NonNull};

/// Strategy object for acquiring, releasing, and populating element slots.
///
/// The default `construct` and `destroy` are a plain write and an in-place drop;
/// override them to observe or instrument the element lifecycle.
pub trait SlotAllocator<T> {
    /// Acquires storage for `n` slots.
    ///
    /// # Errors
    ///
    /// Returns `CapVecError::LengthError` if `n > self.max_size()`, and
    /// `CapVecError::AllocationFailed` if memory could not be obtained.
    fn allocate(&self, n: usize) -> Result<NonNull<T>, CapVecError>;

    /// Releases storage previously returned by `allocate(n)`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the same `n`,
    /// and none of its slots may still hold a live value.
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize);

    /// Writes `value` into an uninitialized slot.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes and must not hold a live value.
    unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        // SAFETY: guaranteed by the caller
        unsafe { slot.as_ptr().write(value) }
    }

    /// Drops the value in a live slot, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used again.
    unsafe fn destroy(&self, slot: NonNull<T>) {
        // SAFETY: guaranteed by the caller
        unsafe { ptr::drop_in_place(slot.as_ptr()) }
    }

    /// Largest number of slots a single `allocate` call can satisfy.
    fn max_size(&self) -> usize;
}

/// Borrowed allocators allocate from the allocator they point to.
impl<T, A: SlotAllocator<T> + ?Sized> SlotAllocator<T> for &A {
    fn allocate(&self, n: usize) -> Result<NonNull<T>, CapVecError> {
        (**self).allocate(n)
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: forwarded contract
        unsafe { (**self).deallocate(ptr, n) }
    }

    unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        // SAFETY: forwarded contract
        unsafe { (**self).construct(slot, value) }
    }

    unsafe fn destroy(&self, slot: NonNull<T>) {
        // SAFETY: forwarded contract
        unsafe { (**self).destroy(slot) }
    }

    fn max_size(&self) -> usize {
        (**self).max_size()
    }
}

/// Global-heap allocator backed by `alloc::alloc`.
///
/// Zero-sized requests (including any request for a zero-sized `T`) never touch
/// the heap and yield a dangling, well-aligned pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HeapAllocator;

impl<T> SlotAllocator<T> for HeapAllocator {
    fn allocate(&self, n: usize) -> Result<NonNull<T>, CapVecError> {
        let max = <Self as SlotAllocator<T>>::max_size(self);
        if n > max {
            return Err(CapVecError::LengthError { requested: n, max });
        }

        let layout =
            Layout::array::<T>(n).map_err(|_| CapVecError::LengthError { requested: n, max })?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        // SAFETY: layout has a non-zero size
        let raw = unsafe { alloc(layout) };
        NonNull::new(raw.cast::<T>()).ok_or(CapVecError::AllocationFailed { requested: n })
    }

    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        let Ok(layout) = Layout::array::<T>(n) else {
            return;
        };
        if layout.size() != 0 {
            // SAFETY: ptr came from `alloc` with this exact layout
            unsafe { dealloc(ptr.as_ptr().cast::<u8>(), layout) }
        }
    }

    fn max_size(&self) -> usize {
        isize::MAX as usize / mem::size_of::<T>().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_construct_destroy_deallocate() {
        let heap = HeapAllocator;
        let ptr: NonNull<u64> = heap.allocate(4).unwrap();
        unsafe {
            for i in 0..4 {
                heap.construct(ptr.add(i), i as u64 * 10);
            }
            assert_eq!(*ptr.add(3).as_ptr(), 30);
            for i in 0..4 {
                heap.destroy(ptr.add(i));
            }
            heap.deallocate(ptr, 4);
        }
    }

    #[test]
    fn test_allocate_beyond_max_size() {
        let heap = HeapAllocator;
        let max = <HeapAllocator as SlotAllocator<u32>>::max_size(&heap);
        let result: Result<NonNull<u32>, _> = heap.allocate(max + 1);
        assert_eq!(
            result,
            Err(CapVecError::LengthError {
                requested: max + 1,
                max
            })
        );
    }

    #[test]
    fn test_borrowed_allocator_forwards() {
        type Borrowed<'a> = &'a HeapAllocator;

        let heap = HeapAllocator;
        let borrowed: Borrowed<'_> = &heap;
        let ptr = <Borrowed<'_> as SlotAllocator<u16>>::allocate(&borrowed, 2).unwrap();
        unsafe {
            <Borrowed<'_> as SlotAllocator<u16>>::construct(&borrowed, ptr, 7);
            assert_eq!(*ptr.as_ptr(), 7);
            <Borrowed<'_> as SlotAllocator<u16>>::destroy(&borrowed, ptr);
            <Borrowed<'_> as SlotAllocator<u16>>::deallocate(&borrowed, ptr, 2);
        }
        assert_eq!(
            <Borrowed<'_> as SlotAllocator<u16>>::max_size(&borrowed),
            <HeapAllocator as SlotAllocator<u16>>::max_size(&heap)
        );
    }

    #[test]
    fn test_zero_sized_types_do_not_touch_the_heap() {
        let heap = HeapAllocator;
        let ptr: NonNull<()> = heap.allocate(1000).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { heap.deallocate(ptr, 1000) };
    }
}
