//! see [`HashMap`]

use core::{
    convert::Infallible,
    fmt,
    hash::{BuildHasher, Hash},
};

use lineage::{
    purge::{Flow, CONTINUE},
    Cursor, EngineMut, Generation, Purged, Range, Result, Tracked,
};
use lineage_arena::NodeKey;
use rustc_hash::FxBuildHasher;

use crate::hash::HashEngine;

/// A position in a [`HashMap`], `None` past the last entry
pub type Position = Option<NodeKey>;

/// A hash map with generation-checked cursors and ranges
///
/// Entries are visited in insertion order, which is stable under removal but
/// unrelated to key order. Every insertion of a new key, every removal and
/// every clear makes all outstanding cursors and ranges stale. Updating the
/// value of an existing key does not.
pub struct HashMap<K, V, S = FxBuildHasher> {
    inner: Tracked<HashEngine<K, V, S>>,
}

impl<K: Hash + Eq, V> HashMap<K, V> {
    /// An empty map
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }

    /// An empty map with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> HashMap<K, V, S> {
    /// An empty map hashing with `hasher`
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: Tracked::new(HashEngine::with_hasher(hasher)),
        }
    }

    /// An empty map with room for `capacity` entries, hashing with `hasher`
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            inner: Tracked::new(HashEngine::with_capacity_and_hasher(capacity, hasher)),
        }
    }

    /// The hasher
    pub fn hasher(&self) -> &S {
        self.inner.engine().hasher()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The generation cursors and ranges are checked against
    pub fn generation(&self) -> Generation {
        self.inner.generation()
    }

    /// Insert `value` under `key`, replacing the value of an existing entry
    ///
    /// Returns true if a new entry was created.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_with(key, value, |old, new| *old = new)
    }

    /// Insert `value` under `key`, or if the key is present, let `update`
    /// combine the stored value with `value`
    ///
    /// Returns true if a new entry was created.
    pub fn insert_with(&mut self, key: K, value: V, update: impl FnOnce(&mut V, V)) -> bool {
        self.inner
            .insert_with((key, value), |old, new| update(&mut old.1, new.1))
    }

    /// The value stored under `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        self.value(&self.find(key)).ok()
    }

    /// The value stored under `key`, mutably
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let cursor = self.find(key);
        self.value_mut(&cursor).ok()
    }

    /// Returns true if `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        !self.find(key).is_empty()
    }

    /// Remove the entry stored under `key`, returning its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key).map(|(_, value)| value)
    }

    /// A cursor on the entry for `key`, empty if there is none
    pub fn find(&self, key: &K) -> Cursor<Position> {
        self.inner.find(key)
    }

    /// The key under `cursor`
    pub fn key(&self, cursor: &Cursor<Position>) -> Result<&K> {
        self.inner.get(cursor).map(|(key, _)| key)
    }

    /// The value under `cursor`
    pub fn value(&self, cursor: &Cursor<Position>) -> Result<&V> {
        self.inner.get(cursor).map(|(_, value)| value)
    }

    /// The value under `cursor`, mutably
    pub fn value_mut(&mut self, cursor: &Cursor<Position>) -> Result<&mut V> {
        self.inner.entry_mut(cursor).map(|(_, value)| value)
    }

    /// Step `cursor` past its entry
    pub fn advance(&self, cursor: &mut Cursor<Position>) -> Result<()> {
        self.inner.advance(cursor)
    }

    /// Remove the entry under `cursor`
    ///
    /// Returns the entry and a fresh cursor on the entry that followed it.
    pub fn remove_at(&mut self, cursor: &Cursor<Position>) -> Result<((K, V), Cursor<Position>)> {
        self.inner.remove_at(cursor)
    }

    /// A range over every entry
    pub fn range(&self) -> Range<Position> {
        self.inner.range()
    }

    /// The first entry of `range`
    pub fn front(&self, range: &Range<Position>) -> Result<(&K, &V)> {
        self.inner.front(range).map(|(key, value)| (key, value))
    }

    /// The last entry of `range`
    pub fn back(&self, range: &Range<Position>) -> Result<(&K, &V)> {
        self.inner.back(range).map(|(key, value)| (key, value))
    }

    /// The first entry of `range`, with its value mutable
    pub fn front_mut(&mut self, range: &Range<Position>) -> Result<(&K, &mut V)> {
        self.inner.front_mut(range)
    }

    /// The last entry of `range`, with its value mutable
    pub fn back_mut(&mut self, range: &Range<Position>) -> Result<(&K, &mut V)> {
        self.inner.back_mut(range)
    }

    /// Drop the first entry of `range` from the range
    pub fn pop_front(&self, range: &mut Range<Position>) -> Result<()> {
        self.inner.pop_front(range)
    }

    /// Drop the last entry of `range` from the range
    pub fn pop_back(&self, range: &mut Range<Position>) -> Result<()> {
        self.inner.pop_back(range)
    }

    /// Returns true if `cursor` is current and on an entry of this map
    pub fn belongs(&self, cursor: &Cursor<Position>) -> bool {
        self.inner.belongs(cursor)
    }

    /// Returns true if `range` is current and both ends are live
    pub fn belongs_range(&self, range: &Range<Position>) -> bool {
        self.inner.belongs_range(range)
    }

    /// Remove every entry of `range`, returning how many were removed
    pub fn remove_range(&mut self, range: &Range<Position>) -> Result<usize> {
        self.inner.remove_range(range)
    }

    /// Visit every entry in order, removing those `visit` flags
    ///
    /// Stops after the entry for which `visit` breaks, or at the first error,
    /// keeping the entry that failed.
    pub fn try_purge<X>(
        &mut self,
        mut visit: impl FnMut(&mut bool, &K, &mut V) -> Result<Flow, X>,
    ) -> Result<Purged, X> {
        self.inner
            .try_purge(|engine, position, remove| match engine.entry_mut(position) {
                Some((key, value)) => visit(remove, key, value),
                None => Ok(CONTINUE),
            })
    }

    /// [`HashMap::try_purge`] with an infallible visitor
    pub fn purge(&mut self, mut visit: impl FnMut(&mut bool, &K, &mut V) -> Flow) -> Purged {
        match self.try_purge(|remove, key, value| Ok::<_, Infallible>(visit(remove, key, value))) {
            Ok(purged) => purged,
            Err(never) => match never {},
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterate over the entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + '_ {
        self.inner.iter().map(|(key, value)| (key, value))
    }

    /// Iterate over the keys in insertion order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.inner.iter().map(|(key, _)| key)
    }

    /// Iterate over the values in insertion order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.inner.iter().map(|(_, value)| value)
    }
}

impl<K: Hash + Eq, V> Default for HashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Clone for HashMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let engine = HashEngine::with_capacity_and_hasher(self.len(), self.hasher().clone());
        Self {
            inner: self.inner.duplicate_into(engine),
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for HashMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for HashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S> fmt::Debug for HashMap<K, V, S>
where
    K: Hash + Eq + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec::Vec};

    use lineage::purge::STOP;

    use super::*;

    #[test]
    fn updating_a_value_keeps_cursors() {
        let mut map = HashMap::new();
        map.insert("a", 1);
        let cursor = map.find(&"a");

        assert!(!map.insert_with("a", 10, |old, new| *old += new));
        assert_eq!(map.value(&cursor), Ok(&11));

        *map.value_mut(&cursor).unwrap() += 1;
        assert_eq!(map.get(&"a"), Some(&12));
    }

    #[test]
    fn missing_keys_give_empty_cursors() {
        let map = HashMap::<u8, u8>::new();
        let cursor = map.find(&1);
        assert!(cursor.is_empty());
        assert!(map.value(&cursor).unwrap_err().is_invalid_access());
        assert!(!map.belongs(&cursor));
    }

    #[test]
    fn remove_at_returns_a_fresh_successor() {
        let mut map = (0..4).map(|i| (i, i * 10)).collect::<HashMap<_, _>>();
        let cursor = map.find(&1);

        let (entry, next) = map.remove_at(&cursor).unwrap();
        assert_eq!(entry, (1, 10));
        assert_eq!(map.key(&next), Ok(&2));
        assert!(map.value(&cursor).unwrap_err().is_stale());
        assert!(map.remove_at(&cursor).unwrap_err().is_stale());
    }

    #[test]
    fn purge_sees_keys_and_values() {
        let mut map = (0..10).map(|i| (i, i)).collect::<HashMap<u32, u32>>();
        let before = map.generation();

        let purged = map.purge(|remove, key, value| {
            *value *= 2;
            *remove = key % 3 == 0;
            CONTINUE
        });

        assert_eq!(purged.removed, 4);
        assert!(purged.finished);
        assert_ne!(map.generation(), before);
        assert_eq!(map.get(&4), Some(&8));
        assert!(!map.contains_key(&9));
    }

    #[test]
    fn purge_stopping_early() {
        let mut map = (0..10).map(|i| (i, ())).collect::<HashMap<u32, ()>>();
        let mut seen = 0;
        let purged = map.purge(|remove, _, _| {
            seen += 1;
            *remove = true;
            if seen == 3 {
                STOP
            } else {
                CONTINUE
            }
        });

        assert_eq!(purged.visited, 3);
        assert!(!purged.finished);
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn failing_purge_keeps_the_failing_entry() {
        let mut map = (0..5).map(|i| (i, ())).collect::<HashMap<u32, ()>>();
        let result = map.try_purge(|remove, key, _| {
            if *key == 2 {
                return Err("two");
            }
            *remove = true;
            Ok(CONTINUE)
        });

        assert_eq!(result, Err("two"));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, 3, 4]);
    }

    #[test]
    fn reinserted_keys_go_last() {
        let mut map = (0..4).map(|i| (i, ())).collect::<HashMap<u32, ()>>();
        map.remove(&1);
        map.insert(1, ());
        map.insert(9, ());
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 2, 3, 1, 9]);
    }

    #[test]
    fn untouched_purge_keeps_handles() {
        let mut map = (0..3).map(|i| (i, ())).collect::<HashMap<u32, ()>>();
        let cursor = map.find(&1);
        map.purge(|_, _, _| CONTINUE);
        assert!(map.belongs(&cursor));
    }

    #[test]
    fn ranges_walk_from_both_ends() {
        let mut map = (0..3).map(|i| (i, i)).collect::<HashMap<u32, u32>>();
        let mut range = map.range();

        assert_eq!(map.front(&range), Ok((&0, &0)));
        assert_eq!(map.back(&range), Ok((&2, &2)));
        *map.back_mut(&range).unwrap().1 = 20;

        map.pop_front(&mut range).unwrap();
        map.pop_back(&mut range).unwrap();
        assert_eq!(map.front(&range), Ok((&1, &1)));
        assert_eq!(map.back(&range), Ok((&1, &1)));

        map.pop_back(&mut range).unwrap();
        assert!(range.is_empty());
        assert!(map.front(&range).unwrap_err().is_invalid_access());
        assert_eq!(map.get(&2), Some(&20));
    }

    #[test]
    fn remove_range_empties_the_map() {
        let mut map = (0..6).map(|i| (i, ())).collect::<HashMap<u32, ()>>();
        let range = map.range();
        assert!(map.belongs_range(&range));
        assert_eq!(map.remove_range(&range), Ok(6));
        assert!(map.is_empty());
        assert!(map.remove_range(&range).unwrap_err().is_stale());
    }

    #[test]
    fn clones_are_independent() {
        let mut map = HashMap::new();
        map.insert(1, "one");
        let copy = map.clone();
        map.clear();

        assert!(map.is_empty());
        assert_eq!(copy.get(&1), Some(&"one"));
        assert_eq!(format!("{copy:?}"), r#"{1: "one"}"#);
    }
}
