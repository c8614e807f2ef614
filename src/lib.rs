#![cfg_attr(not(test), no_std)]

//! `CapVec`: a contiguous, growable vector with manual capacity management.
//!
//! `CapVec<T, A>` keeps its elements in one heap buffer obtained from a pluggable
//! [`SlotAllocator`]. It offers O(1) random access, amortized O(1) `push_back`, and
//! predictable, per-operation growth, so callers can reason about exactly when the
//! buffer moves.
//!
//! This crate is `no_std` compatible and only needs `alloc`.
//!
//! Buffer layout: `[live elements: 0..len][uninitialized slots: len..capacity]`
//!
//! # Growth Policy
//!
//! Growth only happens when the required size no longer fits. The new capacity
//! depends on which operation asked:
//!
//! - `push_back()`: `1` from empty, otherwise double the capacity
//! - `reserve(n)`: exactly `n`
//! - `resize(n, v)`: `n` if `n` is not above the previous `resize` target or is
//!   more than twice it, otherwise twice the previous target
//! - `insert()`: exactly `len + 1`
//! - `insert_n(.., n, ..)`: `len * 2` if that exceeds `len + n`, otherwise `len + n`
//! - `insert_iter()`: `len * 2 + count`
//!
//! ```
//! # use capvec::CapVec;
//! let mut vec = CapVec::new();
//! for value in [42, 42, 42] {
//!     vec.push_back(value).unwrap();
//! }
//! assert_eq!(vec.capacity(), 4); // 1 -> 2 -> 4
//!
//! vec.insert(vec.begin(), 7).unwrap();
//! assert_eq!(vec, [7, 42, 42, 42]);
//!
//! vec.erase_range(vec.begin() + 1, vec.begin() + 3);
//! assert_eq!(vec, [7, 42]);
//!
//! vec.clear();
//! assert!(vec.is_empty());
//! assert_eq!(vec.capacity(), 4);
//! ```
//!
//! # Cursors
//!
//! Positions are [`Cursor`]s: plain offsets that support random-access
//! arithmetic and comparison. They do not borrow the vector, so they survive
//! mutations, but they are invalidated by any reallocation and by inserts or
//! erases at or before their offset. Dereference them through the vector:
//!
//! ```
//! # use capvec::CapVec;
//! let mut vec = CapVec::from([1, 2, 3]);
//! let second = vec.begin() + 1;
//! vec[second] = 20;
//!
//! let last = vec.rbegin();
//! assert_eq!(vec[last], 3);
//!
//! let backwards: Vec<_> = vec.iter_rev().copied().collect();
//! assert_eq!(backwards, [3, 20, 1]);
//! ```
//!
//! `begin()`/`end()` yield [`Mutable`] cursors, `cbegin()`/`cend()` yield
//! [`ReadOnly`] ones; a mutable cursor converts into a read-only one but not the
//! other way round. [`Reverse`] adapts any [`Bidirectional`] cursor, including
//! [`NodeCursor`] over an external ordered structure.
//!
//! # Errors
//!
//! Operations that may need a bigger buffer return [`CapVecError::LengthError`]
//! when the request exceeds [`CapVec::max_size`]. [`CapVec::at`] returns
//! [`CapVecError::OutOfRange`] for indices at or past the end.
//!
//! ```
//! # use capvec::{CapVec, CapVecError};
//! let vec = CapVec::from([1, 2, 3]);
//! assert_eq!(vec.at(2), Ok(&3));
//! assert_eq!(vec.at(3), Err(CapVecError::OutOfRange { index: 3, size: 3 }));
//! ```
//!
//! ## Features
//!
//! - `std`: implements `std::error::Error` through `thiserror/std` and enables
//!   `tracing/std`.

extern crate alloc;

mod allocator;
mod core;
mod cursor;
mod error;
mod growth;
mod iter;
mod modifiers;
mod node;

// Re-export public types and traits
pub use crate::allocator::{HeapAllocator, SlotAllocator};
pub use crate::core::{swap, CapVec};
pub use crate::cursor::{Bidirectional, Cursor, Mutable, ReadOnly, Reverse};
pub use crate::error::CapVecError;
pub use crate::iter::{IntoIter, Iter, RevIter};
pub use crate::node::{Neighbors, NodeCursor};
