//! Cursor over an externally owned ordered structure.
//!
//! `CapVec` does not implement an ordered map, but its reverse adapter must walk
//! one. The structure only has to expose in-order neighbors through
//! [`Neighbors`]; how it stores or balances its nodes stays private to it.

use crate::cursor::Bidirectional;
use core::fmt;

/// In-order navigation over the nodes of an ordered structure.
///
/// `Node` is a cheap handle (an index, a key, a reference) that stays valid while
/// the structure is borrowed.
pub trait Neighbors {
    type Node: Copy + Eq;

    /// Smallest node, or `None` when empty.
    fn first(&self) -> Option<Self::Node>;

    /// Largest node, or `None` when empty.
    fn last(&self) -> Option<Self::Node>;

    /// In-order successor of `node`.
    fn next(&self, node: Self::Node) -> Option<Self::Node>;

    /// In-order predecessor of `node`.
    fn prev(&self, node: Self::Node) -> Option<Self::Node>;
}

/// Bidirectional cursor over a [`Neighbors`] structure.
///
/// `None` is the past-the-end position. Stepping back from it lands on
/// `last()`, which is what lets [`Reverse`](crate::Reverse) start from `end`.
pub struct NodeCursor<'a, S: Neighbors> {
    structure: &'a S,
    node: Option<S::Node>,
}

impl<'a, S: Neighbors> NodeCursor<'a, S> {
    /// Cursor at the first node (equal to `end` when the structure is empty).
    pub fn begin(structure: &'a S) -> Self {
        Self {
            structure,
            node: structure.first(),
        }
    }

    /// Past-the-end cursor.
    pub fn end(structure: &'a S) -> Self {
        Self {
            structure,
            node: None,
        }
    }

    pub fn at(structure: &'a S, node: S::Node) -> Self {
        Self {
            structure,
            node: Some(node),
        }
    }

    /// The node under the cursor, `None` at the end.
    #[must_use]
    pub fn node(&self) -> Option<S::Node> {
        self.node
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }
}

impl<S: Neighbors> Bidirectional for NodeCursor<'_, S> {
    fn step_forward(&mut self) {
        self.node = self.node.and_then(|node| self.structure.next(node));
    }

    fn step_back(&mut self) {
        self.node = match self.node {
            Some(node) => self.structure.prev(node),
            None => self.structure.last(),
        };
    }
}

impl<S: Neighbors> Clone for NodeCursor<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Neighbors> Copy for NodeCursor<'_, S> {}

impl<S: Neighbors> PartialEq for NodeCursor<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.structure, other.structure) && self.node == other.node
    }
}

impl<S: Neighbors> Eq for NodeCursor<'_, S> {}

impl<S: Neighbors> fmt::Debug for NodeCursor<'_, S>
where
    S::Node: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCursor").field("node", &self.node).finish()
    }
}
