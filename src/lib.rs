//! A sorted container with stable handles.
//!
//! [`AvlTreeList`] keeps its elements sorted under a caller-supplied
//! comparator. Each element is a node of an AVL tree and a link of a doubly
//! linked list at the same time, which gives
//!
//! - logarithmic [`add`](AvlTreeList::add) returning a [`Handle`],
//! - logarithmic [`remove`](AvlTreeList::remove) by handle, without a key search,
//! - logarithmic neighbor queries
//!   ([`get_smallest_above`](AvlTreeList::get_smallest_above),
//!   [`get_greatest_below`](AvlTreeList::get_greatest_below)),
//! - constant-time access to the smallest and greatest element,
//! - cheap [`reposition`](AvlTreeList::reposition) of an element whose key
//!   changed slightly after insertion.
//!
//! ```
//! use avl_list::AvlTreeList;
//!
//! #[derive(Debug)]
//! struct Event {
//!     time: u32,
//!     name: &'static str,
//! }
//!
//! let mut timeline = AvlTreeList::with_comparator(|a: &Event, b: &Event| a.time.cmp(&b.time));
//! timeline.add(Event { time: 30, name: "c" });
//! let b = timeline.add(Event { time: 20, name: "b" });
//! timeline.add(Event { time: 10, name: "a" });
//!
//! // Push `b` past `c` and restore the order.
//! timeline.update(b, |event| event.time = 40).unwrap();
//! let names: Vec<_> = timeline.iter().map(|event| event.name).collect();
//! assert_eq!(names, ["a", "c", "b"]);
//!
//! assert_eq!(timeline.pop_smallest().map(|event| event.name), Some("a"));
//! assert_eq!(timeline.remove(b).map(|event| event.name), Ok("b"));
//! assert_eq!(timeline.len(), 1);
//! ```

mod error;
mod iter;
mod list;
mod node;
mod tree;

pub use error::HandleError;
pub use iter::{IntoIter, Iter};
pub use list::{AvlTreeList, ClearPolicy, OrdComparator};
pub use node::Handle;
