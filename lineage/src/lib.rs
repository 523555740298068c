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

//! # lineage
//!
//! The shared vocabulary of the lineage collections: the error taxonomy, the
//! generation counter used to detect stale handles, single-shot cursors and
//! bidirectional ranges, the purge protocol, and the storage-engine contract
//! associative containers are built on.
//!
//! ## Staleness
//!
//! Handles into a container (cursors, ranges, array views) are not tied to the
//! container by a borrow. Instead every storage owner carries a [`Generation`]
//! which it bumps on each structural mutation, and every handle remembers the
//! generation it was created under. Using a handle whose generation no longer
//! matches fails with [`Error::Stale`] rather than reading through moved or
//! reclaimed storage.
//!
//! ```
//! use lineage::{Cursor, Error, Generation};
//!
//! let mut live = Generation::new();
//! let cursor = Cursor::new(3_usize, live);
//!
//! live.bump();
//! assert!(matches!(live.check(cursor.stamp()), Err(Error::Stale { .. })));
//! ```
//!
//! ## Purge
//!
//! Removal while traversing always goes through one algorithm: the predicate
//! sees every element once, in order, and sets a flag to request removal.
//! See [`purge`] for the packed-array compaction and the position driven
//! variant used by engines.

extern crate alloc;

pub mod cursor;
pub mod engine;
pub mod error;
pub mod generation;
pub mod purge;
pub mod tracked;

pub use cursor::{Cursor, Range};
pub use engine::{Engine, EngineMut, OrderedEngine};
pub use error::{Error, Result};
pub use generation::Generation;
pub use purge::{Flow, Purged};
pub use tracked::Tracked;
