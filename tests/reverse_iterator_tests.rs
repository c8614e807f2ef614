use capvec::{CapVec, Cursor, ReadOnly, Reverse};

#[test]
fn test_reverse_iterator_populated_vector() {
    let vec = CapVec::from(["first", "second", "third"]);

    let items: Vec<_> = vec.iter_rev().collect();
    assert_eq!(items.len(), 3);
    assert_eq!(*items[0], "third");
    assert_eq!(*items[1], "second");
    assert_eq!(*items[2], "first");
}

#[test]
fn test_reverse_iterator_empty_vector() {
    let vec: CapVec<u8> = CapVec::new();

    assert_eq!(vec.rbegin(), vec.rend());
    assert_eq!(vec.iter_rev().count(), 0);
}

#[test]
fn test_reverse_iterator_size_hint() {
    let vec = CapVec::from([1, 2, 3]);

    let mut iter = vec.iter_rev();
    assert_eq!(iter.size_hint(), (3, Some(3)));

    iter.next();
    assert_eq!(iter.size_hint(), (2, Some(2)));

    iter.next();
    iter.next();
    assert_eq!(iter.size_hint(), (0, Some(0)));
}

#[test]
fn test_reverse_iterator_compare_with_forward() {
    let vec = CapVec::from([1, 2, 3, 4, 5]);

    let forward: Vec<_> = vec.iter().collect();
    let mut reverse: Vec<_> = vec.iter_rev().collect();
    reverse.reverse();
    assert_eq!(forward, reverse);
}

#[test]
fn test_reverse_cursor_walk() {
    let vec = CapVec::from([1, 2, 3]);

    let mut cursor = vec.rbegin();
    let mut seen = Vec::new();
    while cursor != vec.rend() {
        seen.push(vec[cursor]);
        cursor.advance();
    }
    assert_eq!(seen, [3, 2, 1]);
}

#[test]
fn test_reverse_cursor_base_is_one_past() {
    let vec = CapVec::from([1, 2, 3]);

    let rbegin = vec.rbegin();
    assert_eq!(*rbegin.base(), vec.end());
    assert_eq!(rbegin.current(), vec.end() - 1);
    assert_eq!(*vec.rend().base(), vec.begin());
}

#[test]
fn test_reverse_cursor_arithmetic() {
    let vec = CapVec::from([10, 20, 30, 40]);

    let rbegin = vec.crbegin();
    assert_eq!(vec[rbegin + 1], 30);
    assert_eq!(vec[rbegin + 3], 10);
    assert_eq!(vec.crend() - rbegin, 4);
    assert!(rbegin < vec.crend());

    let mut cursor = vec.crend();
    cursor -= 1;
    assert_eq!(vec[cursor], 10);
    cursor.retreat();
    assert_eq!(vec[cursor], 20);
    cursor += 2;
    assert_eq!(cursor, vec.crend());
}

#[test]
fn test_reverse_cursor_writes_through() {
    let mut vec = CapVec::from([1, 2, 3]);

    let last = vec.rbegin();
    vec[last] = 30;
    assert_eq!(vec, [1, 2, 30]);
}

#[test]
fn test_reverse_read_only_conversion() {
    let vec = CapVec::from([1, 2, 3]);

    let read_only: Reverse<Cursor<i32, ReadOnly>> = vec.rbegin().into();
    assert_eq!(read_only, vec.crbegin());
    assert_eq!(vec[read_only], 3);
}

#[test]
fn test_reverse_after_modifiers() {
    let mut vec = CapVec::new();
    for i in 0..6 {
        vec.push_back(i).unwrap();
    }
    vec.insert(vec.begin() + 2, 100).unwrap();
    vec.erase_range(vec.begin(), vec.begin() + 1);
    vec.insert_n(vec.end(), 2, 7).unwrap();

    let forward: Vec<_> = vec.iter().copied().collect();
    let backward: Vec<_> = vec.iter_rev().copied().collect();
    assert_eq!(forward, [1, 100, 2, 3, 4, 5, 7, 7]);
    assert_eq!(backward, [7, 7, 5, 4, 3, 2, 100, 1]);
}

#[test]
fn test_reverse_iterator_double_ended() {
    let vec = CapVec::from([1, 2, 3, 4]);

    let mut iter = vec.iter_rev();
    assert_eq!(iter.next_back(), Some(&1));
    assert_eq!(iter.next(), Some(&4));
    let rest: Vec<_> = iter.collect();
    assert_eq!(rest, [&3, &2]);
}
