//! see [`TreeEngine`]

use alloc::collections::BTreeSet;
use core::{
    cmp::Ordering,
    fmt,
    ops::Bound::{Excluded, Included, Unbounded},
};

use lineage::{Engine, OrderedEngine};

/// A position in a [`TreeEngine`]
///
/// A position remembers the element it sits on rather than a node, so it
/// survives rebalancing. Staleness is the container's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreePos<T> {
    /// On the element equal to this one
    At(T),
    /// Past the last element
    End,
}

/// An ordered engine over a [`BTreeSet`]
#[derive(Clone, PartialEq, Eq)]
pub struct TreeEngine<T> {
    set: BTreeSet<T>,
}

impl<T> TreeEngine<T> {
    /// An empty engine
    pub const fn new() -> Self {
        Self {
            set: BTreeSet::new(),
        }
    }
}

impl<T> Default for TreeEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> TreeEngine<T> {
    fn at(value: Option<&T>) -> TreePos<T> {
        match value {
            Some(value) => TreePos::At(value.clone()),
            None => TreePos::End,
        }
    }

    fn after(&self, value: &T) -> TreePos<T> {
        Self::at(self.set.range::<T, _>((Excluded(value), Unbounded)).next())
    }

    /// The position of the first element not less than `value`
    pub fn lower_bound(&self, value: &T) -> TreePos<T> {
        Self::at(self.set.range::<T, _>((Included(value), Unbounded)).next())
    }

    /// The smallest element
    pub fn first(&self) -> Option<&T> {
        self.set.first()
    }

    /// The largest element
    pub fn last(&self) -> Option<&T> {
        self.set.last()
    }
}

impl<T: Ord + Clone> Engine for TreeEngine<T> {
    type Item = T;
    type Key = T;
    type Position = TreePos<T>;

    fn len(&self) -> usize {
        self.set.len()
    }

    fn begin(&self) -> TreePos<T> {
        Self::at(self.set.first())
    }

    fn end(&self) -> TreePos<T> {
        TreePos::End
    }

    fn find(&self, key: &T) -> TreePos<T> {
        Self::at(self.set.get(key))
    }

    fn next(&self, position: &TreePos<T>) -> TreePos<T> {
        match position {
            TreePos::At(value) => self.after(value),
            TreePos::End => TreePos::End,
        }
    }

    fn prev(&self, position: &TreePos<T>) -> TreePos<T> {
        match position {
            TreePos::At(value) => {
                Self::at(self.set.range::<T, _>((Unbounded, Excluded(value))).next_back())
            }
            TreePos::End => Self::at(self.set.last()),
        }
    }

    fn get(&self, position: &TreePos<T>) -> Option<&T> {
        match position {
            TreePos::At(value) => self.set.get(value),
            TreePos::End => None,
        }
    }

    fn add(&mut self, item: T, update: impl FnOnce(&mut T, T)) -> bool {
        match self.set.take(&item) {
            Some(mut stored) => {
                update(&mut stored, item);
                self.set.insert(stored);
                false
            }
            None => self.set.insert(item),
        }
    }

    fn take(&mut self, position: &TreePos<T>) -> Option<(T, TreePos<T>)> {
        let TreePos::At(value) = position else {
            return None;
        };
        let item = self.set.take(value)?;
        let next = self.after(&item);
        Some((item, next))
    }

    fn clear(&mut self) {
        self.set.clear();
    }

    fn copy_to(&self, other: &mut Self) {
        other.set.clone_from(&self.set);
    }
}

impl<T: Ord + Clone> OrderedEngine for TreeEngine<T> {
    fn position_cmp(&self, a: &TreePos<T>, b: &TreePos<T>) -> Ordering {
        match (a, b) {
            (TreePos::At(a), TreePos::At(b)) => a.cmp(b),
            (TreePos::At(_), TreePos::End) => Ordering::Less,
            (TreePos::End, TreePos::At(_)) => Ordering::Greater,
            (TreePos::End, TreePos::End) => Ordering::Equal,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.set).finish()
    }
}
