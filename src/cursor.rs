//! Position handles into a `CapVec` buffer and the reverse adapter over them.
//!
//! A [`Cursor`] is an offset, not a pointer. It never owns or borrows memory, so
//! it is `Copy` and can outlive mutations of its container. The price is that
//! validity is a contract, not a check:
//!
//! - any reallocation (growth through `push_back`, `reserve`, `resize`,
//!   `insert*`, `assign*`) invalidates every cursor;
//! - `insert*` and `erase*` invalidate cursors at or after the affected offset,
//!   which then denote whatever element moved into their slot;
//! - dropping the container invalidates everything.
//!
//! Dereferencing an invalidated cursor never touches freed memory. It either
//! panics (offset at or past the size) or yields the element now at that offset.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Sub, SubAssign};

/// Marker for cursors that may be used to modify the element they denote.
#[derive(Debug)]
pub enum Mutable {}

/// Marker for cursors that only permit reads.
#[derive(Debug)]
pub enum ReadOnly {}

/// A cursor that can move one step in either direction.
pub trait Bidirectional: Clone {
    /// Moves to the next position in traversal order.
    fn step_forward(&mut self);

    /// Moves to the previous position in traversal order.
    fn step_back(&mut self);
}

/// Random-access position inside a `CapVec<T, _>`.
///
/// `M` is [`Mutable`] for cursors obtained from `begin`/`end` and [`ReadOnly`] for
/// `cbegin`/`cend`. A mutable cursor converts into a read-only one with `From`;
/// there is no conversion back.
pub struct Cursor<T, M = ReadOnly> {
    offset: usize,
    _marker: PhantomData<fn() -> (*const T, M)>,
}

impl<T, M> Cursor<T, M> {
    pub(crate) fn at(offset: usize) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    /// Zero-based offset of the slot this cursor denotes.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves to the next slot.
    pub fn inc(&mut self) {
        self.offset = self.offset.wrapping_add(1);
    }

    /// Moves to the previous slot.
    pub fn dec(&mut self) {
        self.offset = self.offset.wrapping_sub(1);
    }

    /// Returns a read-only cursor at the same position.
    #[must_use]
    pub fn read_only(self) -> Cursor<T, ReadOnly> {
        Cursor::at(self.offset)
    }
}

impl<T> From<Cursor<T, Mutable>> for Cursor<T, ReadOnly> {
    fn from(cursor: Cursor<T, Mutable>) -> Self {
        cursor.read_only()
    }
}

impl<T, M> Clone for Cursor<T, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M> Copy for Cursor<T, M> {}

impl<T, M> fmt::Debug for Cursor<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T, M, N> PartialEq<Cursor<T, N>> for Cursor<T, M> {
    fn eq(&self, other: &Cursor<T, N>) -> bool {
        self.offset == other.offset
    }
}

impl<T, M> Eq for Cursor<T, M> {}

impl<T, M, N> PartialOrd<Cursor<T, N>> for Cursor<T, M> {
    fn partial_cmp(&self, other: &Cursor<T, N>) -> Option<Ordering> {
        Some(self.offset.cmp(&other.offset))
    }
}

impl<T, M> Ord for Cursor<T, M> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl<T, M> Hash for Cursor<T, M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
    }
}

impl<T, M> Add<isize> for Cursor<T, M> {
    type Output = Self;

    fn add(self, n: isize) -> Self {
        Self::at(self.offset.wrapping_add_signed(n))
    }
}

impl<T, M> Sub<isize> for Cursor<T, M> {
    type Output = Self;

    fn sub(self, n: isize) -> Self {
        Self::at(self.offset.wrapping_add_signed(n.wrapping_neg()))
    }
}

impl<T, M> AddAssign<isize> for Cursor<T, M> {
    fn add_assign(&mut self, n: isize) {
        *self = *self + n;
    }
}

impl<T, M> SubAssign<isize> for Cursor<T, M> {
    fn sub_assign(&mut self, n: isize) {
        *self = *self - n;
    }
}

/// Signed distance from `other` to `self`.
impl<T, M, N> Sub<Cursor<T, N>> for Cursor<T, M> {
    type Output = isize;

    fn sub(self, other: Cursor<T, N>) -> isize {
        self.offset.wrapping_sub(other.offset) as isize
    }
}

impl<T, M> Bidirectional for Cursor<T, M> {
    fn step_forward(&mut self) {
        self.inc();
    }

    fn step_back(&mut self) {
        self.dec();
    }
}

/// Reverse adapter over a bidirectional cursor.
///
/// Holds its base one past the element it denotes: the element is found at
/// `base - 1`. Advancing moves the base backwards, so `[rbegin, rend)` walks the
/// same elements as `[begin, end)` in the opposite order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reverse<C> {
    base: C,
}

impl<C: Bidirectional> Reverse<C> {
    pub fn new(base: C) -> Self {
        Self { base }
    }

    /// The underlying cursor, one past the denoted element.
    pub fn base(&self) -> &C {
        &self.base
    }

    #[must_use]
    pub fn into_base(self) -> C {
        self.base
    }

    /// Cursor at the element this reverse cursor denotes.
    #[must_use]
    pub fn current(&self) -> C {
        let mut cursor = self.base.clone();
        cursor.step_back();
        cursor
    }

    pub fn advance(&mut self) {
        self.base.step_back();
    }

    pub fn retreat(&mut self) {
        self.base.step_forward();
    }
}

impl<C: Bidirectional> Bidirectional for Reverse<C> {
    fn step_forward(&mut self) {
        self.advance();
    }

    fn step_back(&mut self) {
        self.retreat();
    }
}

impl<C: PartialOrd> PartialOrd for Reverse<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.base.partial_cmp(&self.base)
    }
}

impl<C: Ord> Ord for Reverse<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.base.cmp(&self.base)
    }
}

impl<T> From<Reverse<Cursor<T, Mutable>>> for Reverse<Cursor<T, ReadOnly>> {
    fn from(reverse: Reverse<Cursor<T, Mutable>>) -> Self {
        Reverse::new(reverse.base.read_only())
    }
}

impl<T, M> Add<isize> for Reverse<Cursor<T, M>> {
    type Output = Self;

    fn add(self, n: isize) -> Self {
        Reverse::new(self.base - n)
    }
}

impl<T, M> Sub<isize> for Reverse<Cursor<T, M>> {
    type Output = Self;

    fn sub(self, n: isize) -> Self {
        Reverse::new(self.base + n)
    }
}

impl<T, M> AddAssign<isize> for Reverse<Cursor<T, M>> {
    fn add_assign(&mut self, n: isize) {
        self.base -= n;
    }
}

impl<T, M> SubAssign<isize> for Reverse<Cursor<T, M>> {
    fn sub_assign(&mut self, n: isize) {
        self.base += n;
    }
}

/// Signed distance from `other` to `self` in reverse order.
impl<T, M> Sub for Reverse<Cursor<T, M>> {
    type Output = isize;

    fn sub(self, other: Self) -> isize {
        other.base - self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_arithmetic() {
        let begin: Cursor<u8, Mutable> = Cursor::at(0);
        let mut c = begin + 3;
        assert_eq!(c.offset(), 3);
        assert_eq!(c - begin, 3);
        assert_eq!(begin - c, -3);

        c -= 2;
        assert_eq!(c.offset(), 1);
        c.inc();
        c.inc();
        c.dec();
        assert_eq!(c.offset(), 2);
        assert!(begin < c);
    }

    #[test]
    fn test_mutable_converts_to_read_only() {
        let c: Cursor<u8, Mutable> = Cursor::at(5);
        let r: Cursor<u8, ReadOnly> = c.into();
        assert_eq!(r.offset(), 5);
        assert_eq!(c, r);
    }

    #[test]
    fn test_reverse_denotes_element_before_base() {
        let end: Cursor<u8, ReadOnly> = Cursor::at(4);
        let mut rev = Reverse::new(end);
        assert_eq!(rev.current().offset(), 3);

        rev.advance();
        assert_eq!(rev.base().offset(), 3);
        assert_eq!(rev.current().offset(), 2);

        rev.retreat();
        assert_eq!(rev.base().offset(), 4);
    }

    #[test]
    fn test_reverse_ordering_is_inverted() {
        let rbegin = Reverse::new(Cursor::<u8, ReadOnly>::at(4));
        let rend = Reverse::new(Cursor::<u8, ReadOnly>::at(0));
        assert!(rbegin < rend);
        assert_eq!(rend - rbegin, 4);
        assert_eq!((rbegin + 1).base().offset(), 3);
        assert_eq!(rbegin + 4, rend);
    }
}
