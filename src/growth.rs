//! Growth policy: maps a required size to the capacity that gets allocated.
//!
//! Each growing operation has its own rule. The rules are only consulted once the
//! required size no longer fits in the current capacity. `None` means the
//! computation overflowed `usize`; callers report it as a length error.
//!
//! | Operation      | New capacity                                                        |
//! |----------------|---------------------------------------------------------------------|
//! | `push_back`    | `1` from empty, otherwise `capacity * 2`                            |
//! | `reserve(n)`   | `n`                                                                 |
//! | `resize(n)`    | `n` if `n <= mark` or `n > mark * 2`, otherwise `mark * 2`          |
//! | `insert`       | `size + 1`                                                          |
//! | `insert_n`     | `size * 2` if that exceeds `size + n`, otherwise `size + n`         |
//! | `insert_iter`  | `size * 2 + count`                                                  |
//!
//! `mark` is the target of the previous `resize` call, not the current capacity.

pub(crate) fn for_append(capacity: usize) -> Option<usize> {
    if capacity == 0 {
        Some(1)
    } else {
        capacity.checked_mul(2)
    }
}

pub(crate) fn for_resize(n: usize, growth_mark: usize) -> usize {
    match growth_mark.checked_mul(2) {
        Some(doubled) if n > growth_mark && n <= doubled => doubled,
        _ => n,
    }
}

pub(crate) fn for_insert_one(size: usize) -> Option<usize> {
    size.checked_add(1)
}

pub(crate) fn for_insert_n(size: usize, n: usize) -> Option<usize> {
    let exact = size.checked_add(n)?;
    match size.checked_mul(2) {
        Some(doubled) if doubled > exact => Some(doubled),
        _ => Some(exact),
    }
}

pub(crate) fn for_insert_range(size: usize, count: usize) -> Option<usize> {
    size.checked_mul(2)?.checked_add(count)
}
