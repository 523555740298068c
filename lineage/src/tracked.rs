//! see [`Tracked`]

use core::{cmp::Ordering, fmt, iter::FusedIterator};

use crate::{
    cursor::{Cursor, Range},
    engine::{Engine, EngineMut, OrderedEngine},
    error::Error,
    generation::Generation,
    purge::{self, Flow, Purged},
    Result,
};

const NOT_AN_ELEMENT: Error = Error::InvalidAccess {
    what: "position holds no element",
};

/// An [`Engine`] paired with the [`Generation`] that stamps every cursor and
/// range handed out for it
///
/// This is the common body of the associative adapters: it implements the
/// cursor and range protocol, removal through handles, and purge once for every
/// engine. A structural mutation (an insertion that added an element, any
/// removal, a clear) bumps the generation, which invalidates all outstanding
/// handles.
pub struct Tracked<E> {
    engine: E,
    generation: Generation,
}

impl<E: Engine> Tracked<E> {
    /// Wrap an engine
    pub const fn new(engine: E) -> Self {
        Self {
            engine,
            generation: Generation::INITIAL,
        }
    }

    /// The underlying engine
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The current generation
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Add an element, or update the equal one already stored
    ///
    /// see [`Engine::add`]
    pub fn insert_with(
        &mut self,
        item: E::Item,
        update: impl FnOnce(&mut E::Item, E::Item),
    ) -> bool {
        let inserted = self.engine.add(item, update);
        if inserted {
            self.generation.bump();
        }
        inserted
    }

    /// A cursor on the element matching `key`, empty if there is none
    pub fn find(&self, key: &E::Key) -> Cursor<E::Position> {
        self.cursor_at(self.engine.find(key))
    }

    /// A cursor on the first element, empty if there is none
    pub fn first(&self) -> Cursor<E::Position> {
        self.cursor_at(self.engine.begin())
    }

    /// A cursor on `position`, empty if it is the end position
    pub fn cursor_at(&self, position: E::Position) -> Cursor<E::Position> {
        if position == self.engine.end() {
            Cursor::empty(position, self.generation)
        } else {
            Cursor::new(position, self.generation)
        }
    }

    /// A range over every element
    pub fn range(&self) -> Range<E::Position> {
        Range::new(self.engine.begin(), self.engine.end(), self.generation)
    }

    /// The element under `cursor`
    pub fn get(&self, cursor: &Cursor<E::Position>) -> Result<&E::Item> {
        let position = cursor.occupied()?;
        self.generation.check(cursor.stamp())?;
        self.engine.get(position).ok_or(NOT_AN_ELEMENT)
    }

    /// Step a non-empty cursor past its element, which leaves it empty
    pub fn advance(&self, cursor: &mut Cursor<E::Position>) -> Result<()> {
        cursor.occupied()?;
        self.generation.check(cursor.stamp())?;
        cursor.advance_with(|position| self.engine.next(position))
    }

    /// The first element of `range`
    pub fn front(&self, range: &Range<E::Position>) -> Result<&E::Item> {
        let position = range.front_position()?;
        self.generation.check(range.stamp())?;
        self.engine.get(position).ok_or(NOT_AN_ELEMENT)
    }

    /// The last element of `range`
    pub fn back(&self, range: &Range<E::Position>) -> Result<&E::Item> {
        range.front_position()?;
        self.generation.check(range.stamp())?;
        let position = self.engine.prev(range.end());
        self.engine.get(&position).ok_or(NOT_AN_ELEMENT)
    }

    /// Drop the first element of `range`
    pub fn pop_front(&self, range: &mut Range<E::Position>) -> Result<()> {
        self.generation.check(range.stamp())?;
        range.shrink_front_with(|position| self.engine.next(position))
    }

    /// Drop the last element of `range`
    pub fn pop_back(&self, range: &mut Range<E::Position>) -> Result<()> {
        self.generation.check(range.stamp())?;
        range.shrink_back_with(|position| self.engine.prev(position))
    }

    /// Returns true if `cursor` is current and refers to a stored element
    pub fn belongs(&self, cursor: &Cursor<E::Position>) -> bool {
        cursor.stamp() == self.generation
            && !cursor.is_empty()
            && self.engine.get(cursor.position()).is_some()
    }

    /// Returns true if `range` is current and both of its ends are live
    pub fn belongs_range(&self, range: &Range<E::Position>) -> bool {
        range.stamp() == self.generation
            && self.engine.contains(range.begin())
            && self.engine.contains(range.end())
    }

    fn ensure_belongs(&self, cursor: &Cursor<E::Position>) -> Result<()> {
        cursor.occupied()?;
        self.generation.check(cursor.stamp())?;
        if self.belongs(cursor) {
            Ok(())
        } else {
            Err(NOT_AN_ELEMENT)
        }
    }

    /// Remove the element under `cursor`
    ///
    /// Returns the element and a cursor on its successor, stamped with the new
    /// generation.
    pub fn remove_at(
        &mut self,
        cursor: &Cursor<E::Position>,
    ) -> Result<(E::Item, Cursor<E::Position>)> {
        self.ensure_belongs(cursor)?;
        let (item, next) = self
            .engine
            .take(cursor.position())
            .ok_or(NOT_AN_ELEMENT)?;
        self.generation.bump();
        Ok((item, self.cursor_at(next)))
    }

    /// Remove the element matching `key`
    pub fn remove(&mut self, key: &E::Key) -> Option<E::Item> {
        let position = self.engine.find(key);
        let (item, _) = self.engine.take(&position)?;
        self.generation.bump();
        Some(item)
    }

    /// Remove every element in `range`, returning how many were removed
    ///
    /// The range must [belong](Self::belongs_range) to this container, and
    /// its end must be reachable from its start in engine order. Nothing is
    /// removed if it is not.
    pub fn remove_range(&mut self, range: &Range<E::Position>) -> Result<usize> {
        self.generation.check(range.stamp())?;
        if !self.belongs_range(range) {
            return Err(NOT_AN_ELEMENT);
        }

        let end = self.engine.end();
        let mut count = 0_usize;
        let mut position = range.begin().clone();
        while position != *range.end() {
            if position == end {
                return Err(Error::InvalidAccess {
                    what: "range end does not follow range start",
                });
            }
            position = self.engine.next(&position);
            count += 1;
        }

        let mut position = range.begin().clone();
        for _ in 0..count {
            position = self.engine.remove(&position);
        }

        if count != 0 {
            self.generation.bump();
        }
        Ok(count)
    }

    /// Purge every element, see [`purge`](crate::purge)
    ///
    /// `visit` receives the engine and the current position.
    pub fn try_purge<X>(
        &mut self,
        visit: impl FnMut(&mut E, &E::Position, &mut bool) -> Result<Flow, X>,
    ) -> Result<Purged, X> {
        let before = self.engine.len();
        let begin = self.engine.begin();
        let end = self.engine.end();
        let result = purge::purge_positions(&mut self.engine, begin, &end, visit);
        if self.engine.len() != before {
            self.generation.bump();
        }
        result
    }

    /// Remove every element
    pub fn clear(&mut self) {
        let len = self.engine.len();
        self.engine.clear();
        self.generation.bump();
        tracing::debug!(len, "cleared engine");
    }

    /// Duplicate the contents into `engine`, which becomes the engine of the
    /// returned container
    pub fn duplicate_into(&self, mut engine: E) -> Self
    where
        E::Item: Clone,
    {
        self.engine.copy_to(&mut engine);
        Self::new(engine)
    }

    /// Iterate over the elements in engine order
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            engine: &self.engine,
            front: self.engine.begin(),
            back: self.engine.end(),
            remaining: self.engine.len(),
        }
    }
}

impl<E: EngineMut> Tracked<E> {
    /// The key and mutable value under `cursor`
    pub fn entry_mut(
        &mut self,
        cursor: &Cursor<E::Position>,
    ) -> Result<(&E::Key, &mut E::Value)> {
        let position = cursor.occupied()?;
        self.generation.check(cursor.stamp())?;
        self.engine.entry_mut(position).ok_or(NOT_AN_ELEMENT)
    }

    /// The key and mutable value at the front of `range`
    pub fn front_mut(&mut self, range: &Range<E::Position>) -> Result<(&E::Key, &mut E::Value)> {
        let position = range.front_position()?;
        self.generation.check(range.stamp())?;
        self.engine.entry_mut(position).ok_or(NOT_AN_ELEMENT)
    }

    /// The key and mutable value at the back of `range`
    pub fn back_mut(&mut self, range: &Range<E::Position>) -> Result<(&E::Key, &mut E::Value)> {
        range.front_position()?;
        self.generation.check(range.stamp())?;
        let position = self.engine.prev(range.end());
        self.engine.entry_mut(&position).ok_or(NOT_AN_ELEMENT)
    }
}

impl<E: OrderedEngine> Tracked<E> {
    /// [`Tracked::belongs_range`], and the ends are in order
    pub fn belongs_ordered(&self, range: &Range<E::Position>) -> bool {
        self.belongs_range(range)
            && self.engine.position_cmp(range.begin(), range.end()) != Ordering::Greater
    }

    /// A range over `[begin, end)`, failing if the positions are not live or
    /// out of order
    pub fn range_between(&self, begin: E::Position, end: E::Position) -> Result<Range<E::Position>> {
        let range = Range::new(begin, end, self.generation);
        if self.belongs_ordered(&range) {
            Ok(range)
        } else {
            Err(Error::InvalidAccess {
                what: "range ends are not live positions in order",
            })
        }
    }
}

impl<E: Engine + fmt::Debug> fmt::Debug for Tracked<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("generation", &self.generation)
            .field("engine", &self.engine)
            .finish()
    }
}

/// Iterator over the elements of a [`Tracked`] engine
pub struct Iter<'a, E: Engine> {
    engine: &'a E,
    front: E::Position,
    back: E::Position,
    remaining: usize,
}

impl<'a, E: Engine> Iterator for Iter<'a, E> {
    type Item = &'a E::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = self.engine.get(&self.front)?;
        self.front = self.engine.next(&self.front);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E: Engine> DoubleEndedIterator for Iter<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.back = self.engine.prev(&self.back);
        self.remaining -= 1;
        self.engine.get(&self.back)
    }
}

impl<E: Engine> ExactSizeIterator for Iter<'_, E> {}
impl<E: Engine> FusedIterator for Iter<'_, E> {}
