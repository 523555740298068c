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

//! # lineage-assoc
//!
//! Associative containers as thin adapters over storage engines.
//!
//! An engine ([`lineage::Engine`]) knows how to store, find and traverse
//! elements. The adapters add the shared handle protocol on top through
//! [`lineage::Tracked`]: cursors and ranges stamped with a generation, removal
//! through handles, and purge.
//!
//! * [`HashMap`] over a [`HashEngine`]: entries live in a
//!   [`Slab`](lineage_arena::Slab) and are indexed by a
//!   [`hashbrown::HashTable`].
//! * [`TreeSet`] over a [`TreeEngine`]: a B-tree whose positions follow key
//!   order, so ranges can be checked with
//!   [`OrderedEngine::position_cmp`](lineage::OrderedEngine::position_cmp).
//!
//! ```
//! use lineage_assoc::HashMap;
//!
//! let mut map = HashMap::new();
//! map.insert("a", 1);
//! map.insert("b", 2);
//!
//! let cursor = map.find(&"a");
//! assert_eq!(map.value(&cursor), Ok(&1));
//!
//! // any structural change leaves old handles stale
//! map.insert("c", 3);
//! assert!(map.value(&cursor).unwrap_err().is_stale());
//!
//! // lookups that miss hand out an empty cursor
//! assert!(map.find(&"z").is_empty());
//! ```

extern crate alloc;

pub mod hash;
pub mod map;
pub mod set;
pub mod tree;

pub use hash::HashEngine;
pub use lineage::{Cursor, Range};
pub use map::HashMap;
pub use set::TreeSet;
pub use tree::{TreeEngine, TreePos};
