//! Doubly linked nodes and the splice primitives over them
//!
//! Nodes live in a [`NodeAlloc`] and refer to each other by [`NodeKey`]. The
//! primitives in [`Links`] work on any allocator holding [`Node`]s, and on any
//! shape of chain: a detached linear run (`None` at either end) or a circle.

use lineage::{Error, Result};
use lineage_arena::{NodeAlloc, NodeKey};

pub(crate) const DEAD_NODE: Error = Error::InvalidAccess {
    what: "dead node key",
};

/// A link in a doubly linked chain
///
/// A node without a value is a sentinel: it marks the ends of a circular list
/// and never holds data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub(crate) value: Option<T>,
    next: Option<NodeKey>,
    prev: Option<NodeKey>,
}

impl<T> Node<T> {
    /// A detached node holding `value`
    pub const fn new(value: T) -> Self {
        Self::detached(Some(value))
    }

    /// A detached sentinel
    pub const fn sentinel() -> Self {
        Self::detached(None)
    }

    const fn detached(value: Option<T>) -> Self {
        Self {
            value,
            next: None,
            prev: None,
        }
    }

    /// The value, or None for a sentinel
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The node after this one
    pub const fn next(&self) -> Option<NodeKey> {
        self.next
    }

    /// The node before this one
    pub const fn prev(&self) -> Option<NodeKey> {
        self.prev
    }

    /// Is this node a sentinel
    pub const fn is_sentinel(&self) -> bool {
        self.value.is_none()
    }

    /// Does this node have a neighbour on either side
    pub const fn is_linked(&self) -> bool {
        self.next.is_some() || self.prev.is_some()
    }

    // forget both neighbours without touching them, for nodes already cut
    // out of their chain as part of a run
    pub(crate) fn clear_links(&mut self) {
        self.next = None;
        self.prev = None;
    }
}

/// The outcome of [`Links::duplicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duplicate {
    /// The copy of the node the walk started from
    pub head: NodeKey,
    /// The copy of the last node walked
    pub tail: NodeKey,
    /// How many nodes followed the head
    pub count: usize,
    /// Whether the source walk returned to its start, in which case the copy
    /// is closed into a circle as well
    pub circular: bool,
}

/// Splice primitives for any allocator of [`Node`]s
///
/// Every primitive checks the keys it is given before touching anything, and
/// fails with [`Error::InvalidAccess`] if one of them is dead.
pub trait Links<T>: NodeAlloc<Node<T>> {
    /// The node behind `key`
    fn node(&self, key: NodeKey) -> Result<&Node<T>> {
        self.get(key).ok_or(DEAD_NODE)
    }

    /// The node behind `key`, mutably
    fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node<T>> {
        self.get_mut(key).ok_or(DEAD_NODE)
    }

    /// Make `b` follow `a`
    ///
    /// Sets `a.next = b` and `b.prev = a`, skipping whichever side is None.
    /// This is the only place the two directions are written, so they always
    /// agree.
    fn attach(&mut self, a: Option<NodeKey>, b: Option<NodeKey>) -> Result<()> {
        if let Some(a) = a {
            self.node(a)?;
        }
        if let Some(b) = b {
            self.node(b)?;
        }

        if let Some(a) = a {
            self.node_mut(a)?.next = b;
        }
        if let Some(b) = b {
            self.node_mut(b)?.prev = a;
        }
        Ok(())
    }

    /// Splice `node` immediately before `receiver`, returning `receiver`
    ///
    /// `node` is unlinked from wherever it was first.
    fn prepend(&mut self, receiver: NodeKey, node: NodeKey) -> Result<NodeKey> {
        if receiver == node {
            return Err(Error::InvalidAccess {
                what: "node spliced onto itself",
            });
        }
        self.node(receiver)?;
        self.unlink(node)?;

        let prev = self.node(receiver)?.prev;
        self.attach(prev, Some(node))?;
        self.attach(Some(node), Some(receiver))?;
        Ok(receiver)
    }

    /// Splice `node` immediately after `receiver`, returning `receiver`
    ///
    /// `node` is unlinked from wherever it was first.
    fn append(&mut self, receiver: NodeKey, node: NodeKey) -> Result<NodeKey> {
        if receiver == node {
            return Err(Error::InvalidAccess {
                what: "node spliced onto itself",
            });
        }
        self.node(receiver)?;
        self.unlink(node)?;

        let next = self.node(receiver)?.next;
        self.attach(Some(node), next)?;
        self.attach(Some(receiver), Some(node))?;
        Ok(receiver)
    }

    /// Take `node` out of its chain, joining its neighbours and clearing both
    /// of its own links
    fn unlink(&mut self, node: NodeKey) -> Result<()> {
        let Node { prev, next, .. } = *self.node(node)?;
        self.attach(prev, next)?;

        self.node_mut(node)?.clear_links();
        Ok(())
    }

    /// Copy the chain starting at `receiver` into `target`
    ///
    /// The receiver is copied first, then the walk goes forward from just
    /// after it, calling `create` with each value and attaching the new nodes
    /// in order. A walk that ends at a None link copies a linear chain. A walk
    /// that comes back to `receiver` found a circle, and the copy is closed
    /// into a circle too.
    fn duplicate<U, B>(
        &self,
        receiver: NodeKey,
        target: &mut B,
        mut create: impl FnMut(Option<&T>) -> Option<U>,
    ) -> Result<Duplicate>
    where
        B: NodeAlloc<Node<U>> + ?Sized,
    {
        let start = self.node(receiver)?;
        let head = target.allocate(Node::detached(create(start.value())));
        let mut tail = head;
        let mut count = 0;
        let mut walk = start.next;

        let circular = loop {
            let Some(key) = walk else { break false };
            if key == receiver {
                break true;
            }

            let node = self.node(key)?;
            let copy = target.allocate(Node::detached(create(node.value())));
            target.attach(Some(tail), Some(copy))?;
            tail = copy;
            count += 1;
            walk = node.next;
        };

        if circular {
            target.attach(Some(tail), Some(head))?;
        }

        Ok(Duplicate {
            head,
            tail,
            count,
            circular,
        })
    }
}

impl<T, A: NodeAlloc<Node<T>> + ?Sized> Links<T> for A {}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use lineage_arena::{Pool, Slab};

    use super::*;

    fn chain<A: NodeAlloc<Node<char>>>(alloc: &mut A, values: &str) -> Vec<NodeKey> {
        let keys = values
            .chars()
            .map(|c| alloc.allocate(Node::new(c)))
            .collect::<Vec<_>>();
        for pair in keys.windows(2) {
            alloc.attach(Some(pair[0]), Some(pair[1])).unwrap();
        }
        keys
    }

    fn walk<A: NodeAlloc<Node<char>>>(alloc: &A, from: NodeKey) -> Vec<char> {
        let mut out = Vec::new();
        let mut key = Some(from);
        while let Some(k) = key {
            let node = alloc.node(k).unwrap();
            out.extend(node.value());
            key = node.next();
            if key == Some(from) {
                break;
            }
        }
        out
    }

    #[test]
    fn splice_and_unlink() {
        let mut slab = Slab::new();
        let keys = chain(&mut slab, "ac");
        let b = slab.allocate(Node::new('b'));

        assert_eq!(slab.prepend(keys[1], b), Ok(keys[1]));
        assert_eq!(walk(&slab, keys[0]), ['a', 'b', 'c']);

        slab.unlink(b).unwrap();
        assert!(!slab.node(b).unwrap().is_linked());
        assert_eq!(walk(&slab, keys[0]), ['a', 'c']);

        assert_eq!(slab.append(keys[1], b), Ok(keys[1]));
        assert_eq!(walk(&slab, keys[0]), ['a', 'c', 'b']);
        assert_eq!(slab.node(b).unwrap().prev(), Some(keys[1]));
        assert_eq!(slab.node(b).unwrap().next(), None);
    }

    #[test]
    fn dead_keys_are_rejected() {
        let mut slab = Slab::new();
        let a = slab.allocate(Node::new('a'));
        let b = slab.allocate(Node::new('b'));
        slab.free(b);

        assert_eq!(slab.attach(Some(a), Some(b)), Err(DEAD_NODE));
        // nothing was written before the check failed
        assert_eq!(slab.node(a).unwrap().next(), None);
        assert!(slab.prepend(a, a).unwrap_err().is_invalid_access());
    }

    #[test]
    fn duplicate_linear_chain() {
        let mut slab = Slab::new();
        let keys = chain(&mut slab, "xyz");

        let mut pool = Pool::new();
        let copy = slab
            .duplicate(keys[0], &mut pool, |c| c.map(char::to_ascii_uppercase))
            .unwrap();

        assert!(!copy.circular);
        assert_eq!(copy.count, 2);
        assert_eq!(walk(&pool, copy.head), ['X', 'Y', 'Z']);
        assert_eq!(pool.node(copy.tail).unwrap().next(), None);
        assert_eq!(pool.node(copy.head).unwrap().prev(), None);
    }

    #[test]
    fn duplicate_circle() {
        let mut slab = Slab::new();
        let keys = chain(&mut slab, "pqr");
        slab.attach(Some(keys[2]), Some(keys[0])).unwrap();

        let mut target = Slab::new();
        let copy = slab
            .duplicate(keys[1], &mut target, |c| c.copied())
            .unwrap();

        assert!(copy.circular);
        assert_eq!(copy.count, 2);
        assert_eq!(walk(&target, copy.head), ['q', 'r', 'p']);
        assert_eq!(target.node(copy.tail).unwrap().next(), Some(copy.head));
        assert_eq!(target.node(copy.head).unwrap().prev(), Some(copy.tail));
    }

    #[test]
    fn single_node_circle() {
        let mut slab = Slab::new();
        let s = slab.allocate(Node::<char>::sentinel());
        slab.attach(Some(s), Some(s)).unwrap();

        slab.unlink(s).unwrap();
        assert!(!slab.node(s).unwrap().is_linked());
    }
}
