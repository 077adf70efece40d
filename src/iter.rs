use std::fmt;
use std::iter::FusedIterator;

use crate::list::AvlTreeList;
use crate::node::{Link, Node};

/// An iterator over the elements of a list in sorted order.
///
/// Follows the list links, so each step is O(1).
pub struct Iter<'a, T> {
    nodes: &'a [Node],
    values: &'a [Option<T>],
    front: Link,
    back: Link,
    remaining: usize,
}

/// An owning iterator over the elements of a list in sorted order.
pub struct IntoIter<T, C> {
    list: AvlTreeList<T, C>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(
        nodes: &'a [Node],
        values: &'a [Option<T>],
        front: Link,
        back: Link,
        remaining: usize,
    ) -> Self {
        Self {
            nodes,
            values,
            front,
            back,
            remaining,
        }
    }
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        self.front = self.nodes[idx].next;
        self.remaining -= 1;
        self.values[idx].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        self.back = self.nodes[idx].prev;
        self.remaining -= 1;
        self.values[idx].as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T, C> IntoIter<T, C> {
    pub(crate) fn new(list: AvlTreeList<T, C>) -> Self {
        Self { list }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for IntoIter<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T, C> Iterator for IntoIter<T, C> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_smallest()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T, C> DoubleEndedIterator for IntoIter<T, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_greatest()
    }
}

impl<T, C> ExactSizeIterator for IntoIter<T, C> {}

impl<T, C> FusedIterator for IntoIter<T, C> {}
