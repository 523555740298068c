//! see [`HashEngine`]

use core::{
    fmt,
    hash::{BuildHasher, Hash},
};

use hashbrown::HashTable;
use lineage::{Engine, EngineMut};
use lineage_arena::{NodeKey, Slab};
use rustc_hash::FxBuildHasher;

struct Entry<K, V> {
    hash: u64,
    pair: (K, V),
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

/// A hash engine: entries in a [`Slab`], found through a [`HashTable`] of
/// slab keys
///
/// Positions are `Option<NodeKey>`, `None` being the end. Live entries are
/// threaded on a doubly linked list in insertion order, so stepping and
/// removal are O(1) and removing an element never moves any other.
pub struct HashEngine<K, V, S = FxBuildHasher> {
    entries: Slab<Entry<K, V>>,
    table: HashTable<NodeKey>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    hasher: S,
}

impl<K, V> HashEngine<K, V> {
    /// An empty engine with the default hasher
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }
}

impl<K, V> Default for HashEngine<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashEngine<K, V, S> {
    /// An empty engine hashing with `hasher`
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            entries: Slab::new(),
            table: HashTable::new(),
            head: None,
            tail: None,
            hasher,
        }
    }

    /// An empty engine with room for `capacity` entries
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            entries: Slab::with_capacity(capacity),
            table: HashTable::with_capacity(capacity),
            head: None,
            tail: None,
            hasher,
        }
    }

    /// The hasher
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> HashEngine<K, V, S> {
    fn locate(&self, hash: u64, key: &K) -> Option<NodeKey> {
        let entries = &self.entries;
        self.table
            .find(hash, |slot| {
                entries
                    .get(*slot)
                    .is_some_and(|entry| entry.pair.0 == *key)
            })
            .copied()
    }

    fn link_back(&mut self, slot: NodeKey) {
        match self.tail {
            Some(tail) => self.entries[tail].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.entries[slot].prev = self.tail;
        self.tail = Some(slot);
    }

    fn unlink(&mut self, prev: Option<NodeKey>, next: Option<NodeKey>) {
        match prev {
            Some(prev) => self.entries[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.entries[next].prev = prev,
            None => self.tail = prev,
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Engine for HashEngine<K, V, S> {
    type Item = (K, V);
    type Key = K;
    type Position = Option<NodeKey>;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn begin(&self) -> Self::Position {
        self.head
    }

    fn end(&self) -> Self::Position {
        None
    }

    fn find(&self, key: &K) -> Self::Position {
        self.locate(self.hasher.hash_one(key), key)
    }

    fn next(&self, position: &Self::Position) -> Self::Position {
        self.entries.get((*position)?)?.next
    }

    fn prev(&self, position: &Self::Position) -> Self::Position {
        match position {
            Some(slot) => self.entries.get(*slot)?.prev,
            None => self.tail,
        }
    }

    fn get(&self, position: &Self::Position) -> Option<&(K, V)> {
        self.entries.get((*position)?).map(|entry| &entry.pair)
    }

    fn add(&mut self, item: (K, V), update: impl FnOnce(&mut (K, V), (K, V))) -> bool {
        let hash = self.hasher.hash_one(&item.0);

        if let Some(slot) = self.locate(hash, &item.0) {
            update(&mut self.entries[slot].pair, item);
            return false;
        }

        let slot = self.entries.insert(Entry {
            hash,
            pair: item,
            prev: None,
            next: None,
        });
        let entries = &self.entries;
        self.table.insert_unique(hash, slot, |slot| entries[*slot].hash);
        self.link_back(slot);
        true
    }

    fn take(&mut self, position: &Self::Position) -> Option<((K, V), Self::Position)> {
        let slot = (*position)?;
        let entry = self.entries.remove(slot)?;
        self.unlink(entry.prev, entry.next);

        if let Ok(found) = self.table.find_entry(entry.hash, |other| *other == slot) {
            found.remove();
        }

        Some((entry.pair, entry.next))
    }

    fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.table.clear();
        self.head = None;
        self.tail = None;
        tracing::trace!(dropped, "cleared hash engine");
    }

    fn copy_to(&self, other: &mut Self)
    where
        (K, V): Clone,
    {
        other.clear();
        let mut slot = self.head;
        while let Some(entry) = slot.and_then(|slot| self.entries.get(slot)) {
            other.add(entry.pair.clone(), |_, _| {});
            slot = entry.next;
        }
        tracing::debug!(copied = other.len(), "copied hash engine");
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> EngineMut for HashEngine<K, V, S> {
    type Value = V;

    fn entry_mut(&mut self, position: &Self::Position) -> Option<(&K, &mut V)> {
        let entry = self.entries.get_mut((*position)?)?;
        let (key, value) = &mut entry.pair;
        Some((&*key, value))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for HashEngine<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        let mut slot = self.head;
        while let Some(entry) = slot.and_then(|slot| self.entries.get(slot)) {
            map.entry(&entry.pair.0, &entry.pair.1);
            slot = entry.next;
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_updates_in_place() {
        let mut engine = HashEngine::new();
        assert!(engine.add(("a", 1), |_, _| unreachable!()));
        assert!(!engine.add(("a", 5), |old, new| old.1 += new.1));

        let position = engine.find(&"a");
        assert_eq!(engine.get(&position), Some(&("a", 6)));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn removal_hands_back_the_successor() {
        let mut engine = HashEngine::new();
        for i in 0..4 {
            engine.add((i, ()), |_, _| {});
        }

        let second = engine.next(&engine.begin());
        let third = engine.next(&second);
        assert_eq!(engine.remove(&second), third);
        assert_eq!(engine.find(&1), engine.end());
        assert_eq!(engine.len(), 3);

        // removing a position that is already gone is a no-op
        assert_eq!(engine.remove(&second), engine.end());
        assert_eq!(engine.len(), 3);
    }

    #[test]
    fn prev_walks_back_from_the_end() {
        let mut engine = HashEngine::new();
        engine.add(('x', 0), |_, _| {});
        engine.add(('y', 0), |_, _| {});

        let last = engine.prev(&engine.end());
        assert_eq!(engine.get(&last).map(|pair| pair.0), Some('y'));
        assert_eq!(engine.prev(&engine.prev(&last)), engine.end());
    }

    #[test]
    fn walks_in_insertion_order_across_reused_slots() {
        let mut engine = HashEngine::new();
        for key in ["a", "b", "c"] {
            engine.add((key, ()), |_, _| {});
        }
        engine.remove(&engine.find(&"a"));
        // takes the slot "a" left behind
        engine.add(("d", ()), |_, _| {});

        let mut keys = alloc::vec::Vec::new();
        let mut position = engine.begin();
        while let Some(&(key, ())) = engine.get(&position) {
            keys.push(key);
            position = engine.next(&position);
        }
        assert_eq!(keys, ["b", "c", "d"]);

        let last = engine.prev(&engine.end());
        assert_eq!(engine.get(&last), Some(&("d", ())));
        assert_eq!(engine.prev(&engine.find(&"b")), engine.end());
    }

    #[test]
    fn removal_does_not_scan_free_slots() {
        let mut engine = HashEngine::new();
        for i in 0..1024 {
            engine.add((i, ()), |_, _| {});
        }
        for i in 1..1023 {
            engine.remove(&engine.find(&i));
        }

        // the two survivors are adjacent on the entry list despite the gap
        let first = engine.begin();
        let last = engine.find(&1023);
        assert_eq!(engine.next(&first), last);
        assert_eq!(engine.prev(&last), first);
        assert_eq!(engine.remove(&first), last);
        assert_eq!(engine.begin(), last);
    }

    #[test]
    fn copies_are_independent() {
        let mut engine = HashEngine::new();
        engine.add(("k", 1), |_, _| {});

        let mut copy = HashEngine::new();
        copy.add(("stale", 0), |_, _| {});
        engine.copy_to(&mut copy);
        engine.clear();

        assert!(engine.is_empty());
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.get(&copy.find(&"k")), Some(&("k", 1)));
        assert_eq!(copy.find(&"stale"), copy.end());
    }
}
