#![no_std]
#![forbid(
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    unsafe_op_in_unsafe_fn,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![warn(missing_docs)]

//! # lineage-list
//!
//! A circular doubly linked list with a sentinel, over a pluggable node
//! allocator.
//!
//! [`ListHead`] keeps one value-less sentinel node permanently in its circle.
//! The sentinel is both the position before the first node and the position
//! after the last one, so an insert or removal anywhere is the same O(1)
//! splice with no end cases.
//!
//! ```
//! use lineage_list::ListHead;
//!
//! let mut list = ListHead::new();
//! let b = list.push_back('b');
//! list.push_front('a');
//! list.push_back('c');
//!
//! let c = list.remove(b).unwrap();
//! assert_eq!(list.get(c), Ok(&'c'));
//! assert_eq!(list.iter().collect::<String>(), "ac");
//! ```
//!
//! Nodes are allocated from whatever [`NodeAlloc`](lineage_arena::NodeAlloc)
//! the list was built with. A [`Slab`](lineage_arena::Slab) gets every node
//! back as it is removed; a [`Pool`](lineage_arena::Pool) gets nothing back
//! until the list is cleared, at which point it is reset in one go.

extern crate alloc;

pub mod link;
pub mod list;

pub use link::{Links, Node};
pub use list::ListHead;
