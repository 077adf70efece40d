//! A sorted container kept as an AVL tree and a doubly linked list at once.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use crate::error::HandleError;
use crate::iter::{IntoIter, Iter};
use crate::node::{Handle, Link, ListId, Node, NodeIdx, Slot};

/// What [`AvlTreeList::clear`] does with the elements it drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// Walk the list and invalidate every element's handle slot one by one.
    /// The arena keeps its allocation for the elements added afterwards.
    #[default]
    Eager,
    /// Give the list a fresh identity and drop the arena wholesale.
    /// Outstanding handles are rejected as foreign without visiting any node.
    Reset,
}

/// Comparator used by lists built from `T: Ord`.
pub type OrdComparator<T> = fn(&T, &T) -> Ordering;

/// A sorted container with stable handles.
///
/// Elements are kept in the order given by a caller-supplied comparator.
/// Equal elements are kept in insertion order. Every element is at the same
/// time a node of an AVL tree (for logarithmic insertion, removal and
/// neighbor queries) and a link of a doubly linked list (for constant-time
/// access to the extremes and cheap ordered traversal).
///
/// ```
/// use avl_list::AvlTreeList;
/// let mut list = AvlTreeList::new();
/// list.add(3);
/// let two = list.add(2);
/// list.add(1);
/// assert_eq!(list.to_vec(), vec![1, 2, 3]);
/// assert_eq!(list.remove(two), Ok(2));
/// assert_eq!(list.get_smallest_above(&2), Some(&3));
/// ```
///
/// The list is not reentrant: callbacks passed to [`for_each`](Self::for_each)
/// only ever see shared references, and sharing a list between threads needs
/// external locking.
pub struct AvlTreeList<T, C = OrdComparator<T>> {
    pub(crate) id: ListId,
    pub(crate) nodes: Vec<Node>,
    pub(crate) values: Vec<Option<T>>,
    pub(crate) slots: Vec<Slot>,
    pub(crate) free_nodes: Vec<NodeIdx>,
    pub(crate) free_slots: Vec<usize>,
    pub(crate) root: Link,
    pub(crate) first: Link,
    pub(crate) last: Link,
    pub(crate) num_nodes: usize,
    pub(crate) cmp: C,
    clear_policy: ClearPolicy,
}

impl<T: Ord> AvlTreeList<T> {
    /// Creates an empty list ordered by `T`'s `Ord` implementation.
    /// No memory is allocated until the first element is added.
    pub fn new() -> Self {
        Self::with_comparator(<T as Ord>::cmp)
    }

    /// Creates an empty list ordered by `T`'s `Ord` implementation, with room
    /// for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, <T as Ord>::cmp)
    }
}

impl<T, C> AvlTreeList<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty list ordered by `cmp`.
    ///
    /// `cmp` must be a consistent total order. If it is not, element order and
    /// tree balance are unspecified, but memory safety is not affected.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(0, cmp)
    }

    /// Creates an empty list ordered by `cmp`, with room for `capacity` elements.
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            id: ListId::next(),
            nodes: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_nodes: Vec::new(),
            free_slots: Vec::new(),
            root: None,
            first: None,
            last: None,
            num_nodes: 0,
            cmp,
            clear_policy: ClearPolicy::default(),
        }
    }

    /// Adds an element and returns a handle to it.
    ///
    /// An element equal to existing elements is placed after all of them.
    pub fn add(&mut self, value: T) -> Handle {
        let idx = self.link_node(value);
        let slot = self.nodes[idx].slot;
        Handle {
            list: self.id,
            slot,
            generation: self.slots[slot].generation,
        }
    }

    /// Returns the smallest element greater than `key`, or the first element
    /// equal to `key` found on the search path.
    pub fn get_smallest_above(&self, key: &T) -> Option<&T> {
        self.smallest_above(|value| (self.cmp)(key, value))
    }

    /// Returns the greatest element less than `key`, or the first element
    /// equal to `key` found on the search path.
    pub fn get_greatest_below(&self, key: &T) -> Option<&T> {
        self.greatest_below(|value| (self.cmp)(key, value))
    }

    /// Restores the order of the element named by `handle` after its sort key
    /// was changed in place through [`get_mut`](Self::get_mut).
    ///
    /// The element is moved towards its new position by exchanging payloads
    /// with its list neighbors, so the cost is proportional to the distance
    /// travelled. The tree shape is not touched. `handle` keeps naming the
    /// element; handles of the elements it passed keep naming theirs.
    pub fn reposition(&mut self, handle: Handle) -> Result<(), HandleError> {
        let mut idx = self.resolve_logged(handle, "reposition")?;

        if let Some(mut prev) = self.nodes[idx].prev {
            if self.compare(idx, prev) == Ordering::Less {
                loop {
                    self.swap_values(idx, prev);
                    idx = prev;
                    match self.nodes[idx].prev {
                        Some(p) if self.compare(idx, p) == Ordering::Less => prev = p,
                        _ => return Ok(()),
                    }
                }
            }
        }

        if let Some(mut next) = self.nodes[idx].next {
            if self.compare(idx, next) == Ordering::Greater {
                loop {
                    self.swap_values(idx, next);
                    idx = next;
                    match self.nodes[idx].next {
                        Some(n) if self.compare(idx, n) == Ordering::Greater => next = n,
                        _ => return Ok(()),
                    }
                }
            }
        }

        Ok(())
    }

    /// Applies `f` to the element named by `handle`, then repositions it.
    pub fn update<F>(&mut self, handle: Handle, f: F) -> Result<(), HandleError>
    where
        F: FnOnce(&mut T),
    {
        let idx = self.resolve_logged(handle, "update")?;
        if let Some(value) = self.values[idx].as_mut() {
            f(value);
        }
        self.reposition(handle)
    }
}

impl<T, C> AvlTreeList<T, C> {
    /// Returns true if the list contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the list.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree. An empty list has height 0.
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    pub fn clear_policy(&self) -> ClearPolicy {
        self.clear_policy
    }

    /// Sets the policy used by subsequent calls to [`clear`](Self::clear).
    pub fn set_clear_policy(&mut self, policy: ClearPolicy) {
        self.clear_policy = policy;
    }

    /// Builder form of [`set_clear_policy`](Self::set_clear_policy).
    pub fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    /// Returns true if `handle` names an element of this list.
    pub fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Returns a reference to the element named by `handle`.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let idx = self.resolve(handle).ok()?;
        self.values[idx].as_ref()
    }

    /// Returns a mutable reference to the element named by `handle`.
    ///
    /// If the change affects the element's order, call
    /// [`reposition`](Self::reposition) afterwards.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let idx = self.resolve(handle).ok()?;
        self.values[idx].as_mut()
    }

    /// Returns the smallest element.
    pub fn first(&self) -> Option<&T> {
        self.first.map(|idx| self.value(idx))
    }

    /// Returns the greatest element.
    pub fn last(&self) -> Option<&T> {
        self.last.map(|idx| self.value(idx))
    }

    pub fn first_handle(&self) -> Option<Handle> {
        self.first.map(|idx| self.handle_of(idx))
    }

    pub fn last_handle(&self) -> Option<Handle> {
        self.last.map(|idx| self.handle_of(idx))
    }

    /// Returns the handle of the element that follows the one named by `handle`.
    pub fn next_handle(&self, handle: Handle) -> Option<Handle> {
        let idx = self.resolve(handle).ok()?;
        self.nodes[idx].next.map(|next| self.handle_of(next))
    }

    /// Returns the handle of the element that precedes the one named by `handle`.
    pub fn prev_handle(&self, handle: Handle) -> Option<Handle> {
        let idx = self.resolve(handle).ok()?;
        self.nodes[idx].prev.map(|prev| self.handle_of(prev))
    }

    /// Removes the element named by `handle` and returns it.
    ///
    /// A handle that does not name an element of this list is rejected and
    /// the list is left unchanged.
    pub fn remove(&mut self, handle: Handle) -> Result<T, HandleError> {
        let idx = self.resolve_logged(handle, "remove")?;
        Ok(self.unlink_node(idx))
    }

    /// Removes and returns the smallest element.
    pub fn pop_smallest(&mut self) -> Option<T> {
        let idx = self.first?;
        Some(self.unlink_node(idx))
    }

    /// Removes and returns the greatest element.
    pub fn pop_greatest(&mut self) -> Option<T> {
        let idx = self.last?;
        Some(self.unlink_node(idx))
    }

    /// Returns the smallest element `e` for which `f(e)` is `Greater`, unless an
    /// element with `f(e) == Equal` is met first on the search path.
    ///
    /// `f` reports how an element compares to the searched key, the same way as
    /// for [`slice::binary_search_by`].
    pub fn get_smallest_above_by<F>(&self, mut f: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.smallest_above(|value| f(value).reverse())
    }

    /// Returns the greatest element `e` for which `f(e)` is `Less`, unless an
    /// element with `f(e) == Equal` is met first on the search path.
    pub fn get_greatest_below_by<F>(&self, mut f: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.greatest_below(|value| f(value).reverse())
    }

    /// Gets an iterator over the elements in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(
            &self.nodes,
            &self.values,
            self.first,
            self.last,
            self.num_nodes,
        )
    }

    /// Calls `f` on each element in sorted order.
    pub fn for_each<F: FnMut(&T)>(&self, f: F) {
        self.iter().for_each(f);
    }

    /// Calls `f` on each element in reverse sorted order.
    pub fn for_each_reverse<F: FnMut(&T)>(&self, f: F) {
        self.iter().rev().for_each(f);
    }

    /// Copies the elements into a vector in sorted order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Removes all elements.
    ///
    /// Every handle issued so far is invalidated. See [`ClearPolicy`] for how
    /// the elements are released.
    pub fn clear(&mut self) {
        let num_dropped = self.num_nodes;
        match self.clear_policy {
            ClearPolicy::Eager => {
                let mut current = self.first;
                while let Some(idx) = current {
                    current = self.nodes[idx].next;
                    self.release(idx);
                }
            }
            ClearPolicy::Reset => {
                self.id = ListId::next();
                self.nodes.clear();
                self.values.clear();
                self.slots.clear();
                self.free_nodes.clear();
                self.free_slots.clear();
            }
        }
        self.root = None;
        self.first = None;
        self.last = None;
        self.num_nodes = 0;
        log::trace!(
            "cleared {} elements ({:?} policy)",
            num_dropped,
            self.clear_policy
        );
    }

    pub(crate) fn value(&self, idx: NodeIdx) -> &T {
        match &self.values[idx] {
            Some(value) => value,
            None => unreachable!("link to vacant node {}", idx),
        }
    }

    pub(crate) fn handle_of(&self, idx: NodeIdx) -> Handle {
        let slot = self.nodes[idx].slot;
        Handle {
            list: self.id,
            slot,
            generation: self.slots[slot].generation,
        }
    }

    pub(crate) fn resolve(&self, handle: Handle) -> Result<NodeIdx, HandleError> {
        if handle.list != self.id {
            return Err(HandleError::ForeignList(handle));
        }
        match self.slots.get(handle.slot) {
            Some(slot) if slot.generation == handle.generation => {
                slot.node.ok_or(HandleError::Detached(handle))
            }
            _ => Err(HandleError::Detached(handle)),
        }
    }

    fn resolve_logged(&self, handle: Handle, op: &str) -> Result<NodeIdx, HandleError> {
        self.resolve(handle).map_err(|err| {
            log::warn!("{}: {}", op, err);
            err
        })
    }

    /// Stores `value` in a fresh node and binds a handle slot to it.
    /// The node is not linked into the tree or the list yet.
    pub(crate) fn alloc_node(&mut self, value: T, parent: Link) -> NodeIdx {
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                self.slots.len() - 1
            }
        };

        let node = Node::leaf(parent, slot);
        let idx = match self.free_nodes.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                self.values[idx] = Some(value);
                idx
            }
            None => {
                self.nodes.push(node);
                self.values.push(Some(value));
                self.nodes.len() - 1
            }
        };

        self.slots[slot].node = Some(idx);
        idx
    }

    /// Returns the node and its handle slot to the free lists and hands back
    /// the payload. The node must already be unlinked.
    pub(crate) fn release(&mut self, idx: NodeIdx) -> T {
        let slot = self.nodes[idx].slot;
        self.slots[slot].node = None;
        self.slots[slot].generation = self.slots[slot].generation.wrapping_add(1);
        self.free_slots.push(slot);

        self.nodes[idx] = Node::detached();
        self.free_nodes.push(idx);
        match self.values[idx].take() {
            Some(value) => value,
            None => unreachable!("released vacant node {}", idx),
        }
    }

    /// Exchanges the payloads of two nodes. Handle slots move with their
    /// payloads, so handles keep naming the same elements.
    fn swap_values(&mut self, a: NodeIdx, b: NodeIdx) {
        self.values.swap(a, b);
        let slot_a = self.nodes[a].slot;
        let slot_b = self.nodes[b].slot;
        self.nodes[a].slot = slot_b;
        self.nodes[b].slot = slot_a;
        self.slots[slot_a].node = Some(b);
        self.slots[slot_b].node = Some(a);
    }
}

impl<T: Ord> Default for AvlTreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T, C> Extend<T> for AvlTreeList<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTreeList<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTreeList<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C> IntoIterator for AvlTreeList<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T, C>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
