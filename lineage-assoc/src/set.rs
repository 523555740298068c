//! see [`TreeSet`]

use core::{convert::Infallible, fmt};

use lineage::{
    purge::{Flow, CONTINUE},
    Cursor, Engine, Error, Generation, Purged, Range, Result, Tracked,
};

use crate::tree::{TreeEngine, TreePos};

/// An ordered set with generation-checked cursors and ranges
///
/// Positions follow element order, so a range can be built from a pair of key
/// bounds with [`TreeSet::slice`], and ranges are checked to run forwards
/// before anything is removed through them.
pub struct TreeSet<T> {
    inner: Tracked<TreeEngine<T>>,
}

impl<T: Ord + Clone> TreeSet<T> {
    /// An empty set
    pub const fn new() -> Self {
        Self {
            inner: Tracked::new(TreeEngine::new()),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no elements
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The generation cursors and ranges are checked against
    pub fn generation(&self) -> Generation {
        self.inner.generation()
    }

    /// Add `value`, returning false if an equal element was already present
    pub fn insert(&mut self, value: T) -> bool {
        self.inner.insert_with(value, |_, _| {})
    }

    /// Returns true if an element equal to `value` is present
    pub fn contains(&self, value: &T) -> bool {
        !self.find(value).is_empty()
    }

    /// Remove the element equal to `value`, returning it
    pub fn remove(&mut self, value: &T) -> Option<T> {
        self.inner.remove(value)
    }

    /// The smallest element
    pub fn first(&self) -> Option<&T> {
        self.inner.engine().first()
    }

    /// The largest element
    pub fn last(&self) -> Option<&T> {
        self.inner.engine().last()
    }

    /// A cursor on the element equal to `value`, empty if there is none
    pub fn find(&self, value: &T) -> Cursor<TreePos<T>> {
        self.inner.find(value)
    }

    /// The element under `cursor`
    pub fn get(&self, cursor: &Cursor<TreePos<T>>) -> Result<&T> {
        self.inner.get(cursor)
    }

    /// Step `cursor` past its element
    pub fn advance(&self, cursor: &mut Cursor<TreePos<T>>) -> Result<()> {
        self.inner.advance(cursor)
    }

    /// Remove the element under `cursor`
    ///
    /// Returns the element and a fresh cursor on the next larger one.
    pub fn remove_at(&mut self, cursor: &Cursor<TreePos<T>>) -> Result<(T, Cursor<TreePos<T>>)> {
        self.inner.remove_at(cursor)
    }

    /// A range over every element
    pub fn range(&self) -> Range<TreePos<T>> {
        self.inner.range()
    }

    /// A range over the elements in `[lo, hi)`
    ///
    /// Fails if `lo` is greater than `hi`, even when no element lies between
    /// them.
    pub fn slice(&self, lo: &T, hi: &T) -> Result<Range<TreePos<T>>> {
        if lo > hi {
            return Err(Error::InvalidAccess {
                what: "slice bounds are out of order",
            });
        }
        let engine = self.inner.engine();
        self.inner
            .range_between(engine.lower_bound(lo), engine.lower_bound(hi))
    }

    /// The smallest element of `range`
    pub fn front(&self, range: &Range<TreePos<T>>) -> Result<&T> {
        self.inner.front(range)
    }

    /// The largest element of `range`
    pub fn back(&self, range: &Range<TreePos<T>>) -> Result<&T> {
        self.inner.back(range)
    }

    /// Drop the smallest element of `range` from the range
    pub fn pop_front(&self, range: &mut Range<TreePos<T>>) -> Result<()> {
        self.inner.pop_front(range)
    }

    /// Drop the largest element of `range` from the range
    pub fn pop_back(&self, range: &mut Range<TreePos<T>>) -> Result<()> {
        self.inner.pop_back(range)
    }

    /// Returns true if `cursor` is current and on an element of this set
    pub fn belongs(&self, cursor: &Cursor<TreePos<T>>) -> bool {
        self.inner.belongs(cursor)
    }

    /// Returns true if `range` is current, both ends are live and they are in
    /// order
    pub fn belongs_range(&self, range: &Range<TreePos<T>>) -> bool {
        self.inner.belongs_ordered(range)
    }

    /// Remove every element of `range`, returning how many were removed
    pub fn remove_range(&mut self, range: &Range<TreePos<T>>) -> Result<usize> {
        self.generation().check(range.stamp())?;
        if !self.belongs_range(range) {
            return Err(Error::InvalidAccess {
                what: "range ends are not live positions in order",
            });
        }
        self.inner.remove_range(range)
    }

    /// Visit every element in order, removing those `visit` flags
    ///
    /// Stops after the element for which `visit` breaks, or at the first
    /// error, keeping the element that failed.
    pub fn try_purge<X>(
        &mut self,
        mut visit: impl FnMut(&mut bool, &T) -> Result<Flow, X>,
    ) -> Result<Purged, X> {
        self.inner
            .try_purge(|engine, position, remove| match engine.get(position) {
                Some(value) => visit(remove, value),
                None => Ok(CONTINUE),
            })
    }

    /// [`TreeSet::try_purge`] with an infallible visitor
    pub fn purge(&mut self, mut visit: impl FnMut(&mut bool, &T) -> Flow) -> Purged {
        match self.try_purge(|remove, value| Ok::<_, Infallible>(visit(remove, value))) {
            Ok(purged) => purged,
            Err(never) => match never {},
        }
    }

    /// Remove every element
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterate over the elements in ascending order
    pub fn iter(&self) -> lineage::tracked::Iter<'_, TreeEngine<T>> {
        self.inner.iter()
    }
}

impl<T: Ord + Clone> Default for TreeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> Clone for TreeSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.duplicate_into(TreeEngine::new()),
        }
    }
}

impl<T: Ord + Clone> Extend<T> for TreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord + Clone> FromIterator<T> for TreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T: Ord + Clone> IntoIterator for &'a TreeSet<T> {
    type Item = &'a T;
    type IntoIter = lineage::tracked::Iter<'a, TreeEngine<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord + Clone + fmt::Debug> fmt::Debug for TreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, vec::Vec};

    use super::*;

    fn set(values: impl IntoIterator<Item = i32>) -> TreeSet<i32> {
        values.into_iter().collect()
    }

    #[test]
    fn ordered_basics() {
        let mut set = set([5, 1, 3]);
        assert!(!set.insert(3));
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&5));
        assert_eq!(set.remove(&1), Some(1));
        assert_eq!(set.remove(&1), None);
        assert_eq!(format!("{set:?}"), "{3, 5}");
    }

    #[test]
    fn slice_is_half_open() {
        let set = set(0..10);
        let range = set.slice(&3, &6).unwrap();
        assert_eq!(set.front(&range), Ok(&3));
        assert_eq!(set.back(&range), Ok(&5));

        // bounds need not be elements
        let set = set.iter().map(|v| v * 2).collect::<TreeSet<_>>();
        let range = set.slice(&3, &9).unwrap();
        assert_eq!(set.front(&range), Ok(&4));
        assert_eq!(set.back(&range), Ok(&8));

        let empty = set.slice(&5, &5).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn reversed_slice_is_refused() {
        let set = set(0..10);
        assert!(set.slice(&6, &3).unwrap_err().is_invalid_access());
    }

    #[test]
    fn reversed_slice_between_elements_is_refused() {
        // both bounds resolve to 10, but they are still out of order
        let set = set([1, 10]);
        assert!(set.slice(&5, &3).unwrap_err().is_invalid_access());
        assert!(set.slice(&3, &5).unwrap().is_empty());
    }

    #[test]
    fn elements_need_not_be_debug() {
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
        struct Opaque(u8);

        let mut set = [Opaque(3), Opaque(1), Opaque(2)]
            .into_iter()
            .collect::<TreeSet<_>>();
        let range = set.slice(&Opaque(1), &Opaque(3)).unwrap();
        assert!(set.remove_range(&range) == Ok(2));
        assert!(set.first() == Some(&Opaque(3)));
        assert!(set.find(&Opaque(1)).is_empty());
    }

    #[test]
    fn reversed_range_is_not_removed() {
        let mut set = set(0..10);
        let forward = set.slice(&3, &6).unwrap();
        let (end, begin) = forward.into_bounds();
        let backward = Range::new(begin, end, set.generation());

        assert!(!set.belongs_range(&backward));
        assert!(set.remove_range(&backward).unwrap_err().is_invalid_access());
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn remove_range_and_staleness() {
        let mut set = set(0..10);
        let range = set.slice(&2, &8).unwrap();
        let cursor = set.find(&9);

        assert_eq!(set.remove_range(&range), Ok(6));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [0, 1, 8, 9]);
        assert!(set.get(&cursor).unwrap_err().is_stale());
        assert!(set.remove_range(&range).unwrap_err().is_stale());
    }

    #[test]
    fn cursor_walk_and_remove_at() {
        let mut set = set([10, 20, 30]);
        let mut cursor = set.find(&20);
        assert_eq!(set.get(&cursor), Ok(&20));

        let (removed, next) = set.remove_at(&cursor).unwrap();
        assert_eq!(removed, 20);
        assert_eq!(set.get(&next), Ok(&30));
        assert!(set.advance(&mut cursor).unwrap_err().is_stale());

        let (_, end) = set.remove_at(&next).unwrap();
        assert!(end.is_empty());
    }

    #[test]
    fn purge_in_order() {
        let mut set = set(0..20);
        let mut seen = Vec::new();
        let purged = set.purge(|remove, value| {
            seen.push(*value);
            *remove = value % 2 == 1;
            CONTINUE
        });

        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_eq!(purged.removed, 10);
        assert!(set.iter().all(|v| v % 2 == 0));
        assert_eq!(set.iter().rev().next(), Some(&18));
    }
}
