//! A bump-style node pool with bulk reclamation
//!
//! see [`Pool`]

use core::{fmt, ops};

use alloc::vec::Vec;

use crate::{key::NodeKey, NodeAlloc};

#[cold]
#[inline(never)]
fn epochs_exhausted() -> ! {
    panic!("pool epoch counter exhausted")
}

#[cold]
#[inline(never)]
fn dead_pool_key(key: NodeKey, epoch: u32) -> ! {
    panic!(
        "tried to access pool slot {} from epoch {}, but the pool is at epoch {epoch}",
        key.index(),
        key.generation(),
    )
}

/// A pool that hands out slots in order and reclaims them all at once
///
/// Nothing is reclaimed individually, [`NodeAlloc::free`] always returns None.
/// [`Pool::reset`] drops every value and starts a new epoch; keys remember the
/// epoch they were issued in, so every key from before a reset is dead.
pub struct Pool<T> {
    values: Vec<T>,
    epoch: u32,
}

impl<T> Pool<T> {
    /// Create a new [`Pool`]
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            epoch: 0,
        }
    }

    /// Create a new [`Pool`] with room for `capacity` nodes before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            epoch: 0,
        }
    }

    /// Number of values handed out since the last reset
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was handed out since the last reset
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The current epoch, advanced by every reset
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Allocated capacity
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Store a value, returning its key
    pub fn insert(&mut self, value: T) -> NodeKey {
        let key = NodeKey::new(self.values.len(), self.epoch);
        self.values.push(value);
        key
    }

    /// Get a reference to the value associated with the key
    ///
    /// Returns None if the key is from an earlier epoch
    pub fn get(&self, key: NodeKey) -> Option<&T> {
        if key.generation() == self.epoch {
            self.values.get(key.index())
        } else {
            None
        }
    }

    /// Get a mutable reference to the value associated with the key
    ///
    /// Returns None if the key is from an earlier epoch
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        if key.generation() == self.epoch {
            self.values.get_mut(key.index())
        } else {
            None
        }
    }

    /// Drop every value and start a new epoch, keeping the allocation
    pub fn reset(&mut self) {
        let dropped = self.values.len();
        self.values.clear();
        self.epoch = match self.epoch.checked_add(1) {
            Some(epoch) => epoch,
            None => epochs_exhausted(),
        };
        tracing::debug!(dropped, epoch = self.epoch, "reset node pool");
    }

    /// Get an iterator over every value handed out in this epoch
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (NodeKey, &T)> + '_ {
        let epoch = self.epoch;
        self.values
            .iter()
            .enumerate()
            .map(move |(index, value)| (NodeKey::new(index, epoch), value))
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("epoch", &self.epoch)
            .field("values", &self.values)
            .finish()
    }
}

impl<T> ops::Index<NodeKey> for Pool<T> {
    type Output = T;

    fn index(&self, key: NodeKey) -> &Self::Output {
        match self.get(key) {
            Some(value) => value,
            None => dead_pool_key(key, self.epoch),
        }
    }
}

impl<T> ops::IndexMut<NodeKey> for Pool<T> {
    fn index_mut(&mut self, key: NodeKey) -> &mut Self::Output {
        let epoch = self.epoch;
        match self.get_mut(key) {
            Some(value) => value,
            None => dead_pool_key(key, epoch),
        }
    }
}

impl<T> NodeAlloc<T> for Pool<T> {
    fn allocate(&mut self, value: T) -> NodeKey {
        self.insert(value)
    }

    fn get(&self, key: NodeKey) -> Option<&T> {
        Pool::get(self, key)
    }

    fn get_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        Pool::get_mut(self, key)
    }

    fn requires_free(&self) -> bool {
        false
    }

    fn free(&mut self, _key: NodeKey) -> Option<T> {
        None
    }

    fn reset(&mut self) {
        Pool::reset(self)
    }

    fn live(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_die_on_reset() {
        let mut pool = Pool::new();
        let a = pool.insert("a");
        let b = pool.insert("b");
        assert_eq!(pool[a], "a");
        assert_eq!(pool[b], "b");

        pool.reset();
        assert_eq!(pool.epoch(), 1);
        assert_eq!(pool.get(a), None);

        let c = pool.insert("c");
        assert_eq!(c.index(), a.index());
        assert_eq!(pool.get(a), None);
        assert_eq!(pool[c], "c");
    }

    #[test]
    fn never_frees_individually() {
        let mut pool = Pool::new();
        let a = pool.insert(1);
        assert_eq!(NodeAlloc::free(&mut pool, a), None);
        assert_eq!(pool.get(a), Some(&1));
        assert_eq!(pool.live(), 1);
    }
}
