//! see [`ListHead`]

use core::{convert::Infallible, fmt, iter::FusedIterator, marker::PhantomData};

use lineage::{purge::Flow, Error, Purged, Result};
use lineage_arena::{NodeAlloc, NodeKey, Slab};

use crate::link::{Links, Node, DEAD_NODE};

const SENTINEL: Error = Error::InvalidAccess {
    what: "sentinel node",
};

const REMOVED: Error = Error::InvalidAccess {
    what: "node is not in the list",
};

#[cold]
#[inline(never)]
fn broken_links(err: Error) -> ! {
    panic!("list links are corrupted: {err}")
}

fn expect_links<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => broken_links(err),
    }
}

/// A circular doubly linked list with a sentinel
///
/// Nodes are addressed by the [`NodeKey`]s handed out on insertion. A key is
/// good until its node is removed; after that every operation taking it fails
/// with [`Error::InvalidAccess`]. The sentinel's key is [`ListHead::end`], it
/// can be inserted before but never read or removed.
pub struct ListHead<T, A = Slab<Node<T>>> {
    sentinel: NodeKey,
    len: usize,
    alloc: A,
    _values: PhantomData<T>,
}

impl<T> ListHead<T> {
    /// An empty list over a fresh [`Slab`]
    pub fn new() -> Self {
        Self::with_alloc(Slab::new())
    }
}

impl<T> Default for ListHead<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: NodeAlloc<Node<T>>> ListHead<T, A> {
    /// An empty list allocating its nodes from `alloc`
    ///
    /// The allocator's reclamation discipline is fixed from here on, see
    /// [`NodeAlloc::requires_free`].
    pub fn with_alloc(mut alloc: A) -> Self {
        let sentinel = Self::new_sentinel(&mut alloc);
        Self {
            sentinel,
            len: 0,
            alloc,
            _values: PhantomData,
        }
    }

    fn new_sentinel(alloc: &mut A) -> NodeKey {
        let sentinel = alloc.allocate(Node::sentinel());
        expect_links(alloc.attach(Some(sentinel), Some(sentinel)));
        sentinel
    }

    /// The number of values in the list
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no values
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The allocator the nodes live in
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The sentinel: one past the last node, and one before the first
    pub const fn end(&self) -> NodeKey {
        self.sentinel
    }

    /// The first node, or the sentinel if the list is empty
    pub fn begin(&self) -> NodeKey {
        expect_links(self.next(self.sentinel))
    }

    /// The last node, or the sentinel if the list is empty
    pub fn last(&self) -> NodeKey {
        expect_links(self.prev(self.sentinel))
    }

    fn linked(&self, key: NodeKey) -> Result<&Node<T>> {
        let node = self.alloc.node(key)?;
        if node.is_linked() {
            Ok(node)
        } else {
            Err(REMOVED)
        }
    }

    /// The node after `key`, the sentinel after the last node
    pub fn next(&self, key: NodeKey) -> Result<NodeKey> {
        self.linked(key)?.next().ok_or(REMOVED)
    }

    /// The node before `key`, the sentinel before the first node
    pub fn prev(&self, key: NodeKey) -> Result<NodeKey> {
        self.linked(key)?.prev().ok_or(REMOVED)
    }

    /// The value at `key`
    pub fn get(&self, key: NodeKey) -> Result<&T> {
        self.linked(key)?.value().ok_or(SENTINEL)
    }

    /// The value at `key`, mutably
    pub fn get_mut(&mut self, key: NodeKey) -> Result<&mut T> {
        self.linked(key)?;
        self.alloc.node_mut(key)?.value.as_mut().ok_or(SENTINEL)
    }

    /// The first value
    pub fn front(&self) -> Option<&T> {
        self.get(self.begin()).ok()
    }

    /// The last value
    pub fn back(&self) -> Option<&T> {
        self.get(self.last()).ok()
    }

    /// Insert `value` immediately before `before`, returning the new node
    ///
    /// Inserting before the sentinel appends, inserting before
    /// [`begin`](Self::begin) prepends.
    pub fn insert(&mut self, before: NodeKey, value: T) -> Result<NodeKey> {
        self.linked(before)?;
        let key = self.alloc.allocate(Node::new(value));
        self.alloc.prepend(before, key)?;
        self.len += 1;
        Ok(key)
    }

    /// Prepend a value
    pub fn push_front(&mut self, value: T) -> NodeKey {
        expect_links(self.insert(self.begin(), value))
    }

    /// Append a value
    pub fn push_back(&mut self, value: T) -> NodeKey {
        expect_links(self.insert(self.sentinel, value))
    }

    /// Remove and return the first value
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.take(self.begin()).ok().map(|(value, _)| value)
    }

    /// Remove and return the last value
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.take(self.last()).ok().map(|(value, _)| value)
    }

    /// Move an existing node so it sits immediately before `before`
    pub fn move_before(&mut self, node: NodeKey, before: NodeKey) -> Result<()> {
        if node == self.sentinel {
            return Err(SENTINEL);
        }
        self.linked(node)?;
        self.linked(before)?;
        if node != before {
            self.alloc.prepend(before, node)?;
        }
        Ok(())
    }

    // hand the value back and the node to the allocator, if it wants it
    fn reclaim(&mut self, key: NodeKey) -> Option<T> {
        if self.alloc.requires_free() {
            self.alloc.free(key)?.value
        } else {
            self.alloc.get_mut(key)?.value.take()
        }
    }

    /// Remove the node at `key`, returning its value and the node that
    /// followed it (the sentinel if it was the last one)
    pub fn take(&mut self, key: NodeKey) -> Result<(T, NodeKey)> {
        if key == self.sentinel {
            return Err(SENTINEL);
        }

        let next = self.next(key)?;
        self.alloc.unlink(key)?;
        let value = self.reclaim(key).ok_or(DEAD_NODE)?;
        self.len -= 1;
        Ok((value, next))
    }

    /// Remove the node at `key`, returning the node that followed it (the
    /// sentinel if it was the last one)
    pub fn remove(&mut self, key: NodeKey) -> Result<NodeKey> {
        self.take(key).map(|(_, next)| next)
    }

    /// Remove the half open run of nodes `[first, last)`, returning how many
    /// were removed
    ///
    /// `last` has to be reachable from `first` without passing the sentinel,
    /// or be the sentinel itself. Nothing is removed if it isn't.
    pub fn remove_range(&mut self, first: NodeKey, last: NodeKey) -> Result<usize> {
        self.linked(last)?;
        if first == last {
            return Ok(0);
        }
        if first == self.sentinel {
            return Err(SENTINEL);
        }

        let mut count = 0;
        let mut key = first;
        while key != last {
            if key == self.sentinel {
                return Err(Error::InvalidAccess {
                    what: "range end does not follow range start",
                });
            }
            key = self.next(key)?;
            count += 1;
        }

        let before = self.prev(first)?;
        self.alloc.attach(Some(before), Some(last))?;

        // the removed run still links to itself internally
        let mut key = first;
        for _ in 0..count {
            let node = self.alloc.node_mut(key)?;
            let next = node.next().unwrap_or(last);
            node.clear_links();
            drop(self.reclaim(key));
            self.len -= 1;
            key = next;
        }

        tracing::trace!(removed = count, "removed list run");
        Ok(count)
    }

    /// Drop every value
    ///
    /// An allocator that [requires free](NodeAlloc::requires_free) gets each
    /// node back individually. Any other is reset in bulk and a new sentinel
    /// is allocated, so every key handed out so far is dead either way.
    pub fn clear(&mut self) {
        let dropped = self.len;
        let bulk = !self.alloc.requires_free();

        if bulk {
            self.alloc.reset();
            self.sentinel = Self::new_sentinel(&mut self.alloc);
        } else {
            let mut key = self.begin();
            while key != self.sentinel {
                let next = expect_links(self.next(key));
                self.alloc.free(key);
                key = next;
            }
            expect_links(self.alloc.attach(Some(self.sentinel), Some(self.sentinel)));
        }

        self.len = 0;
        tracing::debug!(dropped, bulk, "cleared list");
    }

    /// Replace the contents of `target` with a copy of this list
    ///
    /// The copy is allocated from `target`'s own allocator and shares nothing
    /// with `self`.
    pub fn duplicate<B: NodeAlloc<Node<T>>>(&self, target: &mut ListHead<T, B>)
    where
        T: Clone,
    {
        target.clear();

        let copy = expect_links(self.alloc.duplicate(
            self.sentinel,
            &mut target.alloc,
            |value| value.cloned(),
        ));

        if target.alloc.requires_free() {
            target.alloc.free(target.sentinel);
        }
        target.sentinel = copy.head;
        target.len = copy.count;
    }

    /// The first node whose value satisfies `f`, or the sentinel if there is
    /// none
    pub fn find_by(&self, mut f: impl FnMut(&T) -> bool) -> NodeKey {
        let mut key = self.begin();
        while key != self.sentinel {
            let node = expect_links(self.linked(key));
            if node.value().is_some_and(&mut f) {
                return key;
            }
            key = node.next().unwrap_or(self.sentinel);
        }
        self.sentinel
    }

    /// The first node holding `value`, or the sentinel if there is none
    pub fn find(&self, value: &T) -> NodeKey
    where
        T: PartialEq,
    {
        self.find_by(|item| item == value)
    }

    /// Visit every value in order, removing the ones the predicate flags
    ///
    /// See [`lineage::purge`] for the protocol. If `visit` fails, everything
    /// visited before stays settled and the failing value is kept.
    pub fn try_purge<E>(
        &mut self,
        mut visit: impl FnMut(&mut bool, &mut T) -> Result<Flow, E>,
    ) -> Result<Purged, E> {
        let mut purged = Purged::default();
        let mut key = self.begin();

        while key != self.sentinel {
            let mut remove = false;
            let value = match self.get_mut(key) {
                Ok(value) => value,
                Err(err) => broken_links(err),
            };
            let flow = visit(&mut remove, value)?;
            purged.visited += 1;

            key = if remove {
                purged.removed += 1;
                expect_links(self.remove(key))
            } else {
                expect_links(self.next(key))
            };

            if flow.is_break() {
                return Ok(purged);
            }
        }

        purged.finished = true;
        tracing::trace!(
            visited = purged.visited,
            removed = purged.removed,
            "purged list"
        );
        Ok(purged)
    }

    /// [`try_purge`](Self::try_purge) with a predicate that can't fail
    pub fn purge(&mut self, mut visit: impl FnMut(&mut bool, &mut T) -> Flow) -> Purged {
        match self.try_purge(|remove, value| Ok::<_, Infallible>(visit(remove, value))) {
            Ok(purged) => purged,
            Err(never) => match never {},
        }
    }

    /// Iterate over the values in order
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter {
            alloc: &self.alloc,
            front: self.begin(),
            back: self.last(),
            remaining: self.len,
            _values: PhantomData,
        }
    }
}

impl<T: Clone, A: NodeAlloc<Node<T>> + Default> Clone for ListHead<T, A> {
    fn clone(&self) -> Self {
        let mut list = Self::with_alloc(A::default());
        self.duplicate(&mut list);
        list
    }
}

impl<T, A: NodeAlloc<Node<T>>> Extend<T> for ListHead<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T, A: NodeAlloc<Node<T>> + Default> FromIterator<T> for ListHead<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::with_alloc(A::default());
        list.extend(iter);
        list
    }
}

impl<T: fmt::Debug, A: NodeAlloc<Node<T>>> fmt::Debug for ListHead<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, A: NodeAlloc<Node<T>>> IntoIterator for &'a ListHead<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the values of a [`ListHead`]
pub struct Iter<'a, T, A> {
    alloc: &'a A,
    front: NodeKey,
    back: NodeKey,
    remaining: usize,
    _values: PhantomData<&'a T>,
}

impl<'a, T, A: NodeAlloc<Node<T>>> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.alloc.get(self.front)?;
        self.front = node.next()?;
        self.remaining -= 1;
        node.value()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, A: NodeAlloc<Node<T>>> DoubleEndedIterator for Iter<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.alloc.get(self.back)?;
        self.back = node.prev()?;
        self.remaining -= 1;
        node.value()
    }
}

impl<T, A: NodeAlloc<Node<T>>> ExactSizeIterator for Iter<'_, T, A> {}
impl<T, A: NodeAlloc<Node<T>>> FusedIterator for Iter<'_, T, A> {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use lineage::purge::{CONTINUE, STOP};
    use lineage_arena::Pool;

    use super::*;

    fn values<T: Clone, A: NodeAlloc<Node<T>>>(list: &ListHead<T, A>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn empty_list_is_a_sentinel_circle() {
        let list = ListHead::<u8>::new();
        assert_eq!(list.begin(), list.end());
        assert_eq!(list.last(), list.end());
        assert_eq!(list.get(list.end()), Err(SENTINEL));
        assert_eq!(list.front(), None);
        assert_eq!(list.iter().len(), 0);
    }

    #[test]
    fn insert_before_ends() {
        let mut list = ListHead::new();
        let b = list.insert(list.end(), 'b').unwrap();
        list.insert(list.begin(), 'a').unwrap();
        list.insert(list.end(), 'c').unwrap();

        assert_eq!(values(&list), ['a', 'b', 'c']);
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), ['c', 'b', 'a']);
        assert_eq!(list.next(b).and_then(|c| list.next(c)), Ok(list.end()));
    }

    #[test]
    fn remove_returns_successor() {
        let mut list = ListHead::new();
        let a = list.push_back(1);
        let b = list.push_back(2);

        assert_eq!(list.remove(a), Ok(b));
        assert_eq!(list.remove(b), Ok(list.end()));
        assert!(list.is_empty());

        assert_eq!(list.remove(a), Err(DEAD_NODE));
        assert_eq!(list.remove(list.end()), Err(SENTINEL));
    }

    #[test]
    fn removed_pool_nodes_are_rejected() {
        let mut list = ListHead::with_alloc(Pool::new());
        let a = list.push_back(1);
        list.push_back(2);

        assert_eq!(list.take(a), Ok((1, list.begin())));
        assert_eq!(list.get(a), Err(REMOVED));
        assert_eq!(list.remove(a), Err(REMOVED));
        assert_eq!(list.allocator().len(), 3);
    }

    #[test]
    fn remove_half_open_run() {
        let mut list = (0..6).collect::<ListHead<i32>>();
        let first = list.find(&1);
        let last = list.find(&4);

        assert_eq!(list.remove_range(first, last), Ok(3));
        assert_eq!(values(&list), [0, 4, 5]);
        assert_eq!(list.len(), 3);

        // backwards runs are refused untouched
        let first = list.find(&5);
        let last = list.find(&0);
        assert!(list.remove_range(first, last).unwrap_err().is_invalid_access());
        assert_eq!(values(&list), [0, 4, 5]);

        assert_eq!(list.remove_range(list.begin(), list.end()), Ok(3));
        assert!(list.is_empty());
        assert_eq!(list.allocator().len(), 1);
    }

    #[test]
    fn clear_per_discipline() {
        let mut slab_list = (0..4).collect::<ListHead<u32>>();
        let key = slab_list.begin();
        slab_list.clear();
        assert_eq!(slab_list.allocator().len(), 1);
        assert!(slab_list.get(key).is_err());

        let mut pool_list = ListHead::with_alloc(Pool::new());
        pool_list.extend(0..4_u32);
        let key = pool_list.begin();
        pool_list.clear();
        assert_eq!(pool_list.allocator().epoch(), 1);
        assert_eq!(pool_list.allocator().len(), 1);
        assert!(pool_list.get(key).is_err());

        pool_list.push_back(9);
        assert_eq!(values(&pool_list), [9]);
    }

    #[test]
    fn move_before_splices() {
        let mut list = (1..=3).collect::<ListHead<i32>>();
        let three = list.find(&3);
        list.move_before(three, list.begin()).unwrap();
        assert_eq!(values(&list), [3, 1, 2]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn purge_stops_early() {
        let mut list = (0..8).collect::<ListHead<i32>>();
        let purged = list.purge(|remove, value| {
            *remove = *value % 2 == 0;
            if *value == 4 {
                STOP
            } else {
                CONTINUE
            }
        });

        assert_eq!(purged.visited, 5);
        assert_eq!(purged.removed, 3);
        assert!(!purged.finished);
        assert_eq!(values(&list), [1, 3, 5, 6, 7]);
    }

    #[test]
    fn purge_error_keeps_the_failing_value() {
        let mut list = (0..6).collect::<ListHead<i32>>();
        let result = list.try_purge(|remove, value| {
            if *value == 3 {
                return Err(*value);
            }
            *remove = *value % 2 == 0;
            Ok(CONTINUE)
        });

        assert_eq!(result, Err(3));
        assert_eq!(values(&list), [1, 3, 4, 5]);
    }

    #[test]
    fn find_absent_is_the_sentinel() {
        let list = (0..3).collect::<ListHead<i32>>();
        assert_eq!(list.find(&7), list.end());
        assert_eq!(list.get(list.find(&1)), Ok(&1));
    }
}
