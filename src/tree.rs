//! Tree and list maintenance behind [`AvlTreeList`].
//!
//! Every mutation is a single operation over three structures: the AVL tree
//! links, the sorted list links and the per-node heights.

use std::cmp::{self, Ordering};

use crate::list::AvlTreeList;
use crate::node::{Link, NodeIdx};

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<T, C> AvlTreeList<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub(crate) fn compare(&self, a: NodeIdx, b: NodeIdx) -> Ordering {
        (self.cmp)(self.value(a), self.value(b))
    }

    /// Inserts `value` below the last node on its search path and links it
    /// into the list next to that node. Equal values descend to the right.
    pub(crate) fn link_node(&mut self, value: T) -> NodeIdx {
        let mut parent: Link = None;
        let mut is_left = false;
        let mut current = self.root;
        while let Some(node_idx) = current {
            parent = current;
            is_left = (self.cmp)(&value, self.value(node_idx)) == Ordering::Less;
            current = if is_left {
                self.nodes[node_idx].left
            } else {
                self.nodes[node_idx].right
            };
        }

        let idx = self.alloc_node(value, parent);
        self.num_nodes += 1;
        match parent {
            None => {
                self.root = Some(idx);
                self.first = Some(idx);
                self.last = Some(idx);
            }
            Some(parent_idx) => {
                if is_left {
                    self.attach_left(idx, parent_idx);
                } else {
                    self.attach_right(idx, parent_idx);
                }
                self.rebalance(parent);
            }
        }
        idx
    }

    /// Returns true if an in-order walk of the tree yields a sorted sequence.
    pub fn is_tree_sorted(&self) -> bool {
        let mut sorted = true;
        let mut prev: Link = None;
        self.inorder(|idx| {
            if let Some(prev_idx) = prev {
                if self.compare(prev_idx, idx) == Ordering::Greater {
                    sorted = false;
                }
            }
            prev = Some(idx);
        });
        sorted
    }

    /// Returns true if walking the list from the first element yields a sorted
    /// sequence.
    pub fn is_list_sorted(&self) -> bool {
        let mut current = self.first;
        while let Some(idx) = current {
            let next = self.nodes[idx].next;
            if let Some(next_idx) = next {
                if self.compare(idx, next_idx) == Ordering::Greater {
                    return false;
                }
            }
            current = next;
        }
        true
    }

    /// Panics if any structural invariant is violated.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check root link
        if let Some(root_idx) = self.root {
            assert!(self.nodes[root_idx].parent.is_none());
        } else {
            assert!(self.first.is_none());
            assert!(self.last.is_none());
        }

        // Check tree nodes
        let mut num_nodes = 0;
        self.preorder(|idx| {
            let node = self.nodes[idx];
            let mut left_height = 0;
            let mut right_height = 0;

            // Check link for left child node
            if let Some(left_idx) = node.left {
                assert_eq!(self.nodes[left_idx].parent, Some(idx));
                assert_ne!(self.compare(left_idx, idx), Ordering::Greater);
                left_height = self.nodes[left_idx].height;
            }

            // Check link for right child node
            if let Some(right_idx) = node.right {
                assert_eq!(self.nodes[right_idx].parent, Some(idx));
                assert_ne!(self.compare(idx, right_idx), Ordering::Greater);
                right_height = self.nodes[right_idx].height;
            }

            // Check height
            assert_eq!(node.height, cmp::max(left_height, right_height) + 1);

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            // Check handle slot
            assert_eq!(self.slots[node.slot].node, Some(idx));

            num_nodes += 1;
        });
        assert_eq!(num_nodes, self.num_nodes);

        // Check list links against in-order sequence
        let mut inorder = Vec::with_capacity(self.num_nodes);
        self.inorder(|idx| inorder.push(idx));
        let mut listed = Vec::with_capacity(self.num_nodes);
        let mut prev: Link = None;
        let mut current = self.first;
        while let Some(idx) = current {
            assert_eq!(self.nodes[idx].prev, prev);
            listed.push(idx);
            prev = current;
            current = self.nodes[idx].next;
        }
        assert_eq!(self.last, prev);
        assert_eq!(inorder, listed);
        assert!(self.is_list_sorted());

        // Check arena bookkeeping
        assert_eq!(self.nodes.len(), self.values.len());
        assert_eq!(self.nodes.len() - self.free_nodes.len(), self.num_nodes);
        assert_eq!(self.slots.len() - self.free_slots.len(), self.num_nodes);
    }
}

impl<T, C> AvlTreeList<T, C> {
    fn attach_left(&mut self, idx: NodeIdx, parent: NodeIdx) {
        let prev = self.nodes[parent].prev;
        self.nodes[idx].prev = prev;
        self.nodes[idx].next = Some(parent);
        self.nodes[parent].left = Some(idx);
        self.nodes[parent].prev = Some(idx);
        match prev {
            None => self.first = Some(idx),
            Some(prev_idx) => self.nodes[prev_idx].next = Some(idx),
        }
    }

    fn attach_right(&mut self, idx: NodeIdx, parent: NodeIdx) {
        let next = self.nodes[parent].next;
        self.nodes[idx].prev = Some(parent);
        self.nodes[idx].next = next;
        self.nodes[parent].right = Some(idx);
        self.nodes[parent].next = Some(idx);
        match next {
            None => self.last = Some(idx),
            Some(next_idx) => self.nodes[next_idx].prev = Some(idx),
        }
    }

    /// Removes the node from the list and the tree, rebalances, and releases
    /// the node. Returns its payload.
    pub(crate) fn unlink_node(&mut self, idx: NodeIdx) -> T {
        debug_assert!(self.num_nodes >= 1);
        let node = self.nodes[idx];

        match node.prev {
            None => self.first = node.next,
            Some(prev_idx) => self.nodes[prev_idx].next = node.next,
        }
        match node.next {
            None => self.last = node.prev,
            Some(next_idx) => self.nodes[next_idx].prev = node.prev,
        }
        self.num_nodes -= 1;

        match node.right {
            None => {
                // Node to-unlink is stem or leaf, its left child moves up
                if let Some(left_idx) = node.left {
                    self.nodes[left_idx].parent = node.parent;
                }
                self.replace_child(node.parent, idx, node.left);
                self.rebalance(node.parent);
            }
            Some(right_idx) if self.nodes[right_idx].left.is_none() => {
                // Right child is the successor and takes the node's place
                self.nodes[right_idx].left = node.left;
                if let Some(left_idx) = node.left {
                    self.nodes[left_idx].parent = Some(right_idx);
                }
                self.nodes[right_idx].parent = node.parent;
                self.nodes[right_idx].height = node.height;
                self.replace_child(node.parent, idx, Some(right_idx));
                self.rebalance(Some(right_idx));
            }
            Some(right_idx) => {
                // Find smallest node in right sub tree
                let mut min_idx = right_idx;
                while let Some(left_idx) = self.nodes[min_idx].left {
                    min_idx = left_idx;
                }
                let min_parent = self.nodes[min_idx].parent;

                // Detach it, its right child takes its place
                let min_right = self.nodes[min_idx].right;
                if let Some(min_parent_idx) = min_parent {
                    self.nodes[min_parent_idx].left = min_right;
                }
                if let Some(min_right_idx) = min_right {
                    self.nodes[min_right_idx].parent = min_parent;
                }

                // Replace node to-unlink by smallest node (up to 6 links)
                self.nodes[min_idx].left = node.left;
                if let Some(left_idx) = node.left {
                    self.nodes[left_idx].parent = Some(min_idx);
                }
                self.nodes[min_idx].right = Some(right_idx);
                self.nodes[right_idx].parent = Some(min_idx);
                self.nodes[min_idx].parent = node.parent;
                self.nodes[min_idx].height = node.height;
                self.replace_child(node.parent, idx, Some(min_idx));

                // The detached node's old parent lost height
                self.rebalance(min_parent);
            }
        }

        self.release(idx)
    }

    /// Points the parent's link (or the root) that referred to `old` at `new`.
    fn replace_child(&mut self, parent: Link, old: NodeIdx, new: Link) {
        match parent {
            None => self.root = new,
            Some(parent_idx) => {
                if self.nodes[parent_idx].left == Some(old) {
                    self.nodes[parent_idx].left = new;
                } else {
                    self.nodes[parent_idx].right = new;
                }
            }
        }
    }

    pub(crate) fn height_of(&self, link: Link) -> usize {
        match link {
            None => 0,
            Some(idx) => self.nodes[idx].height,
        }
    }

    fn left_height(&self, idx: NodeIdx) -> usize {
        self.height_of(self.nodes[idx].left)
    }

    fn right_height(&self, idx: NodeIdx) -> usize {
        self.height_of(self.nodes[idx].right)
    }

    fn adjust_height(&mut self, idx: NodeIdx) {
        self.nodes[idx].height = cmp::max(self.left_height(idx), self.right_height(idx)) + 1;
    }

    /// Single left rotation. Returns the new top of the subtree.
    fn rotate_left(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some(right_idx) = self.nodes[idx].right else {
            unreachable!("left rotation of node {} without right child", idx);
        };

        let right_left = self.nodes[right_idx].left;
        self.nodes[idx].right = right_left;
        if let Some(right_left_idx) = right_left {
            self.nodes[right_left_idx].parent = Some(idx);
        }

        let parent = self.nodes[idx].parent;
        self.nodes[right_idx].parent = parent;
        self.replace_child(parent, idx, Some(right_idx));

        self.nodes[right_idx].left = Some(idx);
        self.nodes[idx].parent = Some(right_idx);

        self.adjust_height(idx);
        self.adjust_height(right_idx);
        right_idx
    }

    /// Single right rotation. Returns the new top of the subtree.
    fn rotate_right(&mut self, idx: NodeIdx) -> NodeIdx {
        let Some(left_idx) = self.nodes[idx].left else {
            unreachable!("right rotation of node {} without left child", idx);
        };

        let left_right = self.nodes[left_idx].right;
        self.nodes[idx].left = left_right;
        if let Some(left_right_idx) = left_right {
            self.nodes[left_right_idx].parent = Some(idx);
        }

        let parent = self.nodes[idx].parent;
        self.nodes[left_idx].parent = parent;
        self.replace_child(parent, idx, Some(left_idx));

        self.nodes[left_idx].right = Some(idx);
        self.nodes[idx].parent = Some(left_idx);

        self.adjust_height(idx);
        self.adjust_height(left_idx);
        left_idx
    }

    /// Restores the AVL condition at `idx` with one single or double rotation.
    /// The height difference of its subtrees must be exactly 2.
    /// Returns the new top of the subtree.
    fn rotate_to_balance(&mut self, idx: NodeIdx) -> NodeIdx {
        let left_height = self.left_height(idx);
        let right_height = self.right_height(idx);
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);
        if left_height > right_height {
            let Some(left_idx) = self.nodes[idx].left else {
                unreachable!("left heavy node {} without left child", idx);
            };
            if self.right_height(left_idx) > self.left_height(left_idx) {
                // Left right case
                self.rotate_left(left_idx);
            }
            // Left left case
            self.rotate_right(idx)
        } else {
            let Some(right_idx) = self.nodes[idx].right else {
                unreachable!("right heavy node {} without right child", idx);
            };
            if self.left_height(right_idx) > self.right_height(right_idx) {
                // Right left case
                self.rotate_right(right_idx);
            }
            // Right right case
            self.rotate_left(idx)
        }
    }

    /// Walks from `start_from` up to the root, fixing heights and rotating
    /// where a node is out of balance. Stops at the first balanced node whose
    /// height did not change, since nothing above it can have changed either.
    fn rebalance(&mut self, start_from: Link) {
        let mut current = start_from;
        while let Some(idx) = current {
            let left_height = self.left_height(idx);
            let right_height = self.right_height(idx);
            if left_height > right_height + 1 || right_height > left_height + 1 {
                let top_idx = self.rotate_to_balance(idx);
                current = self.nodes[top_idx].parent;
            } else {
                let height = cmp::max(left_height, right_height) + 1;
                if height == self.nodes[idx].height {
                    break;
                }
                self.nodes[idx].height = height;
                current = self.nodes[idx].parent;
            }
        }
    }

    /// Descends towards the key described by `key_cmp`, which compares the key
    /// against a stored value.
    pub(crate) fn smallest_above<F>(&self, mut key_cmp: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut smallest_above = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let value = self.value(idx);
            current = match key_cmp(value) {
                Ordering::Equal => return Some(value),
                Ordering::Less => {
                    smallest_above = Some(value);
                    self.nodes[idx].left
                }
                Ordering::Greater => self.nodes[idx].right,
            };
        }
        smallest_above
    }

    pub(crate) fn greatest_below<F>(&self, mut key_cmp: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut greatest_below = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let value = self.value(idx);
            current = match key_cmp(value) {
                Ordering::Equal => return Some(value),
                Ordering::Less => self.nodes[idx].left,
                Ordering::Greater => {
                    greatest_below = Some(value);
                    self.nodes[idx].right
                }
            };
        }
        greatest_below
    }

    /// Returns true if every node satisfies the AVL condition and carries the
    /// correct height.
    pub fn is_balanced(&self) -> bool {
        let mut balanced = true;
        self.preorder(|idx| {
            let left_height = self.left_height(idx);
            let right_height = self.right_height(idx);
            if left_height > right_height + 1
                || right_height > left_height + 1
                || self.nodes[idx].height != cmp::max(left_height, right_height) + 1
            {
                balanced = false;
            }
        });
        balanced
    }

    /// Counts the nodes reachable from the root.
    pub fn tree_len(&self) -> usize {
        let mut num_nodes = 0;
        self.preorder(|_| num_nodes += 1);
        num_nodes
    }

    /// Counts the nodes reachable from the first element of the list.
    pub fn list_len(&self) -> usize {
        let mut num_nodes = 0;
        let mut current = self.first;
        while let Some(idx) = current {
            num_nodes += 1;
            current = self.nodes[idx].next;
        }
        num_nodes
    }

    /// Returns true if the tree, the list and [`len`](Self::len) agree on the
    /// number of elements.
    pub fn is_count_consistent(&self) -> bool {
        self.tree_len() == self.num_nodes && self.list_len() == self.num_nodes
    }

    fn preorder<F: FnMut(NodeIdx)>(&self, f: F) {
        self.traverse(f, |_| {});
    }

    fn inorder<F: FnMut(NodeIdx)>(&self, f: F) {
        self.traverse(|_| {}, f);
    }

    fn traverse<Pre, In>(&self, mut preorder: Pre, mut inorder: In)
    where
        Pre: FnMut(NodeIdx),
        In: FnMut(NodeIdx),
    {
        if let Some(mut idx) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(idx);
                        if let Some(left_idx) = self.nodes[idx].left {
                            idx = left_idx;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(idx);
                        if let Some(right_idx) = self.nodes[idx].right {
                            idx = right_idx;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        if let Some(parent_idx) = self.nodes[idx].parent {
                            if Some(idx) == self.nodes[parent_idx].left {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            idx = parent_idx;
                        } else {
                            break;
                        }
                    }
                }
            }
        }
    }
}
