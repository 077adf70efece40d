use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) type NodeIdx = usize;
pub(crate) type Link = Option<NodeIdx>;

/// Tree and list links of one arena node.
///
/// The payload lives in a parallel vector so that links can be copied and
/// rewritten freely while payloads are swapped in place.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    pub(crate) prev: Link,
    pub(crate) next: Link,
    pub(crate) height: usize,
    /// Handle slot currently naming the payload stored in this node.
    pub(crate) slot: usize,
}

impl Node {
    pub(crate) fn leaf(parent: Link, slot: usize) -> Self {
        Self {
            left: None,
            right: None,
            parent,
            prev: None,
            next: None,
            height: 1,
            slot,
        }
    }

    /// A node that is not part of any tree or list.
    pub(crate) fn detached() -> Self {
        Self::leaf(None, usize::MAX)
    }
}

/// Indirection between a handle and the node holding its payload.
///
/// `node` is `None` while the slot is free. The generation is bumped whenever
/// the slot is released, which invalidates every handle issued for it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Link,
}

/// Identifies one list instance. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListId(u64);

impl ListId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        ListId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A stable reference to an element of an [`AvlTreeList`](crate::AvlTreeList).
///
/// Returned by [`add`](crate::AvlTreeList::add). A handle stays valid while
/// other elements are added, removed or repositioned, and follows its element
/// when [`reposition`](crate::AvlTreeList::reposition) moves it. It is
/// invalidated by removing the element itself or by clearing the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub(crate) list: ListId,
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}
