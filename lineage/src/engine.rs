//! The contract a storage engine must satisfy to back an associative container
//!
//! Hashing, rehashing and rebalancing are the engine's business. Containers
//! only traverse through positions, dereference them, and remove by position.

use core::cmp::Ordering;

/// Position-addressed storage behind an associative container
///
/// Positions form a sequence from [`Engine::begin`] to [`Engine::end`] in the
/// engine's iteration order. `end` never refers to an element, and
/// [`Engine::find`] returns it when nothing matches.
pub trait Engine {
    /// The stored element
    type Item;

    /// What elements are looked up by
    type Key: ?Sized;

    /// A place in the engine's iteration order
    type Position: Clone + PartialEq;

    /// Number of stored elements
    fn len(&self) -> usize;

    /// Returns true if nothing is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The position of the first element, or `end` if empty
    fn begin(&self) -> Self::Position;

    /// The position one past the last element
    fn end(&self) -> Self::Position;

    /// The position of the element matching `key`, or `end`
    fn find(&self, key: &Self::Key) -> Self::Position;

    /// The position following `position`
    fn next(&self, position: &Self::Position) -> Self::Position;

    /// The position preceding `position`
    fn prev(&self, position: &Self::Position) -> Self::Position;

    /// The element at `position`, if it currently holds one
    fn get(&self, position: &Self::Position) -> Option<&Self::Item>;

    /// Returns true if `position` is part of the live storage: either an
    /// element or the end position
    fn contains(&self, position: &Self::Position) -> bool {
        *position == self.end() || self.get(position).is_some()
    }

    /// Insert `item`, or if an equal element is already stored, hand both to
    /// `update` and leave the stored one in place
    ///
    /// Returns true if `item` was inserted. `update` must not change how the
    /// stored element hashes or orders.
    fn add(&mut self, item: Self::Item, update: impl FnOnce(&mut Self::Item, Self::Item)) -> bool;

    /// Remove the element at `position`, returning it and the position that
    /// followed it
    fn take(&mut self, position: &Self::Position) -> Option<(Self::Item, Self::Position)>;

    /// Remove the element at `position` and return the position that followed
    /// it, or `end` if `position` did not hold an element
    ///
    /// Only `position` itself is invalidated.
    fn remove(&mut self, position: &Self::Position) -> Self::Position {
        match self.take(position) {
            Some((_, next)) => next,
            None => self.end(),
        }
    }

    /// Remove every element
    fn clear(&mut self);

    /// Replace the contents of `other` with copies of this engine's elements
    fn copy_to(&self, other: &mut Self)
    where
        Self::Item: Clone;
}

/// Engines whose elements are key/value pairs with a mutable value
pub trait EngineMut: Engine {
    /// The mutable part of an element
    type Value;

    /// The key and mutable value at `position`
    fn entry_mut(&mut self, position: &Self::Position) -> Option<(&Self::Key, &mut Self::Value)>;
}

/// Engines whose positions follow key order
///
/// Position identity says nothing about order, so range checks go through
/// [`OrderedEngine::position_cmp`].
pub trait OrderedEngine: Engine {
    /// Compare two live positions by the order of their elements, `end` being
    /// greater than every element
    fn position_cmp(&self, a: &Self::Position, b: &Self::Position) -> Ordering;
}
