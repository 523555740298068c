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

//! # lineage-arena
//!
//! Node allocators for linked containers, behind one contract: [`NodeAlloc`].
//!
//! Every allocation is addressed by a [`NodeKey`], which pairs a slot index with
//! a generation so that a key outliving its node never reaches whatever took
//! its place.
//!
//! ## Reclamation disciplines
//!
//! An allocator either wants each node handed back individually, or reclaims
//! everything at once. Containers don't pick one at compile time, they ask
//! [`NodeAlloc::requires_free`] and act on the answer.
//!
//! * [`Slab`] reclaims manually. [`NodeAlloc::free`] returns a slot to a free
//!   list, and the slot's generation moves on so old keys go dead.
//!   ```
//!   use lineage_arena::{NodeAlloc, Slab};
//!
//!   let mut slab = Slab::new();
//!   let a = slab.allocate('a');
//!   assert_eq!(slab.free(a), Some('a'));
//!
//!   // the slot is reused, but `a` does not see the new value
//!   let b = slab.allocate('b');
//!   assert_eq!(a.index(), b.index());
//!   assert_eq!(slab.get(a), None);
//!   ```
//!
//! * [`Pool`] reclaims in bulk. Slots are handed out in order and never reused
//!   until [`NodeAlloc::reset`], which drops every value at once and starts a
//!   new epoch, killing every key handed out before it.
//!   ```
//!   use lineage_arena::{NodeAlloc, Pool};
//!
//!   let mut pool = Pool::new();
//!   let a = pool.allocate('a');
//!   assert!(!pool.requires_free());
//!
//!   pool.reset();
//!   assert_eq!(pool.get(a), None);
//!   ```
//!
//! A container picks its allocator at construction and keeps it, so the two
//! disciplines are never mixed within one instance.

extern crate alloc;

pub mod generation;
pub mod key;
pub mod pool;
pub mod slab;

pub use key::NodeKey;
pub use pool::Pool;
pub use slab::Slab;

/// An allocator for the nodes of a linked container
pub trait NodeAlloc<T> {
    /// Store `value` in a fresh node
    fn allocate(&mut self, value: T) -> NodeKey;

    /// The value of a live node
    ///
    /// Returns None if the key is dead: freed, reset away, or never issued here
    fn get(&self, key: NodeKey) -> Option<&T>;

    /// The mutable value of a live node
    ///
    /// Returns None if the key is dead
    fn get_mut(&mut self, key: NodeKey) -> Option<&mut T>;

    /// Whether nodes must be handed back one by one through [`NodeAlloc::free`]
    ///
    /// Allocators that answer false only reclaim in [`NodeAlloc::reset`].
    fn requires_free(&self) -> bool;

    /// Reclaim a single node, returning its value
    ///
    /// Returns None if the key is dead, or if this allocator does not reclaim
    /// individually
    fn free(&mut self, key: NodeKey) -> Option<T>;

    /// Reclaim every node at once
    fn reset(&mut self);

    /// Number of nodes allocated and not yet reclaimed
    fn live(&self) -> usize;
}
