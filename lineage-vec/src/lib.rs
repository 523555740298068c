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

//! # lineage-vec
//!
//! [`ArrayView`] is an array-backed list whose slices are views into the same
//! buffer.
//!
//! A view built directly from a vector is an *ancestor*: it owns its storage,
//! and the storage's generation counter is authoritative. Slicing a view gives
//! a *descendant* over a sub-window of the same storage, without copying.
//!
//! * Reads and element writes go straight to the shared buffer.
//! * Removal on a descendant is forwarded to the storage, and every view in
//!   its lineage that still tracks the same storage shrinks with it.
//! * Growing or clearing a descendant *forks* it: it copies its window into
//!   fresh storage and becomes an ancestor itself, so siblings never see the
//!   change.
//! * Every structural change bumps the storage generation, and a descendant
//!   whose cached generation no longer matches fails with
//!   [`Error::Stale`](lineage::Error::Stale) instead of reading moved data.
//!
//! ```
//! use lineage_vec::ArrayView;
//!
//! let mut all = ArrayView::from_vec(vec![0, 1, 2, 3, 4, 5]);
//! let mut middle = all.slice(1, 5).unwrap();
//!
//! middle.remove_at(1).unwrap();
//! assert_eq!(middle.to_vec(), Ok(vec![1, 3, 4]));
//! assert_eq!(all.to_vec(), Ok(vec![0, 1, 3, 4, 5]));
//!
//! // growing the slice forks it away from `all`
//! middle.push(9).unwrap();
//! assert!(middle.is_ancestor());
//! assert_eq!(middle.to_vec(), Ok(vec![1, 3, 4, 9]));
//! assert_eq!(all.to_vec(), Ok(vec![0, 1, 3, 4, 5]));
//!
//! // while a structural change on `all` leaves older slices stale
//! let mut tail = all.slice(3, 5).unwrap();
//! all.push(6).unwrap();
//! assert!(tail.push(7).unwrap_err().is_stale());
//! ```

extern crate alloc;

mod store;
pub mod view;

pub use view::ArrayView;
