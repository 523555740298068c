//! see [`ArrayView`]

use core::{cell::RefCell, convert::Infallible, fmt, mem, ops};

use alloc::{
    rc::{Rc, Weak},
    vec::Vec,
};

use lineage::{
    purge::{self, Flow, CONTINUE},
    Cursor, Error, Generation, Purged, Range, Result,
};

use crate::store::{Lineage, Store, Window};

/// A window over a shared, contiguous buffer
///
/// See the [crate docs](crate) for the lineage rules. Handles are not
/// `Clone`: each slice is its own view with its own window, and
/// [`ArrayView::parent`] hands out another handle to an existing view.
pub struct ArrayView<T> {
    lineage: Rc<RefCell<Lineage<T>>>,
}

impl<T> ArrayView<T> {
    /// An empty ancestor
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// An empty ancestor with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    /// An ancestor owning `data`
    pub fn from_vec(data: Vec<T>) -> Self {
        let len = data.len();
        let store = Store::new(data, Generation::new());
        Self {
            lineage: Rc::new(RefCell::new(Lineage::ancestor(store, len, Vec::new()))),
        }
    }

    /// Does this view own its storage
    pub fn is_ancestor(&self) -> bool {
        self.lineage.borrow().is_ancestor()
    }

    /// The number of elements in the window, as of the last time it was
    /// validated
    pub fn len(&self) -> usize {
        let lineage = self.lineage.borrow();
        lineage.end - lineage.start
    }

    /// Returns true if the window is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The live generation for an ancestor, the cached one for a descendant
    pub fn generation(&self) -> Generation {
        let lineage = self.lineage.borrow();
        match &lineage.owned {
            Some(store) => store.generation(),
            None => lineage.generation,
        }
    }

    /// Returns true if the view can still be used
    ///
    /// Ancestors are always fresh. A descendant is fresh while its storage is
    /// alive and has not changed shape behind its back.
    pub fn is_fresh(&self) -> bool {
        self.window().is_ok()
    }

    /// The view this one was sliced from, if it is still around
    ///
    /// Forking does not sever this link.
    pub fn parent(&self) -> Option<Self> {
        let parent = self.lineage.borrow().ancestry.last()?.upgrade()?;
        Some(Self { lineage: parent })
    }

    fn window(&self) -> Result<Window<T>> {
        let lineage = self.lineage.borrow();
        let (store, generation) = match &lineage.owned {
            Some(store) => (Rc::clone(store), store.generation()),
            None => {
                let store = lineage
                    .storage
                    .upgrade()
                    .ok_or(Error::detached(lineage.generation))?;
                store.generation().check(lineage.generation)?;
                (store, lineage.generation)
            }
        };

        Ok(Window {
            store,
            start: lineage.start,
            end: lineage.end,
            generation,
        })
    }

    /// A descendant over `[begin, end)` of this view
    pub fn slice(&self, begin: usize, end: usize) -> Result<Self> {
        let window = self.window()?;
        Error::check_span(begin, end, window.len())?;

        let mut ancestry = self.lineage.borrow().ancestry.clone();
        ancestry.push(Rc::downgrade(&self.lineage));

        Ok(Self {
            lineage: Rc::new(RefCell::new(Lineage {
                start: window.start + begin,
                end: window.start + end,
                generation: window.generation,
                owned: None,
                storage: Rc::downgrade(&window.store),
                ancestry,
            })),
        })
    }

    /// Run `f` over the elements of the window
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R> {
        let window = self.window()?;
        let slice = window.slice()?;
        Ok(f(&slice))
    }

    /// Run `f` over the elements of the window, mutably
    ///
    /// Element writes are not structural: they are seen by every view over
    /// the same storage and do not move the generation.
    pub fn write<R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> Result<R> {
        let window = self.window()?;
        let mut slice = window.slice_mut()?;
        Ok(f(&mut slice))
    }

    /// A copy of the element at `index`
    pub fn get(&self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        self.read(|slice| {
            slice
                .get(index)
                .cloned()
                .ok_or(Error::index(index, slice.len()))
        })?
    }

    /// Overwrite the element at `index`, returning the old one
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.write(|slice| match slice.get_mut(index) {
            Some(slot) => Ok(mem::replace(slot, value)),
            None => Err(Error::index(index, slice.len())),
        })?
    }

    /// A copy of the window
    pub fn to_vec(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        self.read(<[T]>::to_vec)
    }

    /// Call `f` on every element in order
    pub fn for_each(&self, f: impl FnMut(&T)) -> Result<()> {
        self.read(|slice| slice.iter().for_each(f))
    }

    fn fork(&self, data: Vec<T>, generation: Generation) {
        let len = data.len();
        let mut generation = generation;
        // stamps taken before the fork must not match the new storage
        generation.bump();

        let store = Store::new(data, generation);
        let mut lineage = self.lineage.borrow_mut();
        let ancestry = mem::take(&mut lineage.ancestry);
        *lineage = Lineage::ancestor(store, len, ancestry);

        tracing::debug!(len, %generation, "forked array view into its own storage");
    }

    fn grow(&mut self, additional: usize, extend: impl FnOnce(&mut Vec<T>)) -> Result<()>
    where
        T: Clone,
    {
        let window = self.window()?;

        if self.is_ancestor() {
            let len = {
                let mut data = window.store.data_mut()?;
                extend(&mut *data);
                data.len()
            };
            window.store.bump();
            self.lineage.borrow_mut().end = len;
            return Ok(());
        }

        let mut data = Vec::with_capacity(window.len() + additional);
        data.extend_from_slice(&window.slice()?);
        extend(&mut data);
        self.fork(data, window.generation);
        Ok(())
    }

    /// Append one element
    ///
    /// A descendant forks first, which is why this needs `T: Clone`.
    pub fn push(&mut self, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.grow(1, |data| data.push(value))
    }

    /// Append every element of `items`
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.grow(items.len(), |data| data.extend_from_slice(items))
    }

    /// Append every element of `iter`
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()>
    where
        T: Clone,
    {
        let iter = iter.into_iter();
        self.grow(iter.size_hint().0, |data| data.extend(iter))
    }

    /// Append a copy of the window of `other`
    pub fn append_view(&mut self, other: &Self) -> Result<()>
    where
        T: Clone,
    {
        let items = other.to_vec()?;
        self.grow(items.len(), |data| data.extend(items))
    }

    /// Remove every element of the window
    ///
    /// An ancestor empties its storage. A descendant forks into empty storage
    /// of its own, leaving the shared buffer alone.
    pub fn clear(&mut self) -> Result<()> {
        let window = self.window()?;

        if self.is_ancestor() {
            window.store.data_mut()?.clear();
            window.store.bump();
            self.lineage.borrow_mut().end = 0;
        } else {
            self.fork(Vec::new(), window.generation);
        }
        Ok(())
    }

    // shrink every view that tracked `store` as of `before`, walking up from
    // this one to the owner and skipping views that were dropped or forked
    fn settle(&self, store: &Rc<Store<T>>, before: Generation, removed: usize) {
        let after = store.generation();
        let mut refreshed = 0_usize;

        let ancestry = {
            let mut lineage = self.lineage.borrow_mut();
            lineage.end -= removed;
            lineage.generation = after;
            lineage.ancestry.clone()
        };

        for view in ancestry.iter().rev().filter_map(Weak::upgrade) {
            let mut lineage = view.borrow_mut();
            if !lineage.tracks(store, before) {
                continue;
            }

            lineage.end -= removed;
            lineage.generation = after;
            refreshed += 1;
            if lineage.is_ancestor() {
                break;
            }
        }

        tracing::debug!(removed, refreshed, %after, "settled removal across view lineage");
    }

    fn remove_with<R>(
        &mut self,
        span: ops::Range<usize>,
        remove: impl FnOnce(&mut Vec<T>, ops::Range<usize>) -> R,
    ) -> Result<R> {
        let window = self.window()?;
        Error::check_span(span.start, span.end, window.len())?;
        let absolute = window.start + span.start..window.start + span.end;

        let (output, removed) = {
            let mut data = window.store.data_mut()?;
            let len = data.len();
            let output = remove(&mut *data, absolute);
            (output, len - data.len())
        };

        if removed != 0 {
            window.store.bump();
            self.settle(&window.store, window.generation, removed);
        }
        Ok(output)
    }

    /// Remove and return the element at `index`
    ///
    /// On a descendant the removal happens in the shared storage, and this
    /// view along with every view it was sliced from shrinks by one.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.remove_with(index..index.saturating_add(1), |data, span| {
            data.remove(span.start)
        })
    }

    /// Remove `[begin, end)` of the window, returning how many elements went
    pub fn remove_range(&mut self, begin: usize, end: usize) -> Result<usize> {
        self.remove_with(begin..end, |data, span| {
            let purged = purge::compact(data, span, |remove, _| {
                *remove = true;
                Ok::<_, Infallible>(CONTINUE)
            });
            match purged {
                Ok(purged) => purged.removed,
                Err(never) => match never {},
            }
        })
    }

    /// Visit every element of the window in order, removing the flagged ones
    ///
    /// The window is compacted in place, see [`purge::compact`]. Errors from
    /// the view itself are converted into `E`; a failing `visit` keeps its
    /// element and leaves everything after it untouched.
    pub fn try_purge<E: From<Error>>(
        &mut self,
        visit: impl FnMut(&mut bool, &mut T) -> Result<Flow, E>,
    ) -> Result<Purged, E> {
        let len = self.len();
        self.remove_with(0..len, |data, span| purge::compact(data, span, visit))?
    }

    /// [`try_purge`](Self::try_purge) with a predicate that can't fail
    pub fn purge(&mut self, mut visit: impl FnMut(&mut bool, &mut T) -> Flow) -> Result<Purged> {
        self.try_purge(|remove, value| Ok(visit(remove, value)))
    }

    /// A cursor on the first element equal to `value`, or an empty cursor
    pub fn find(&self, value: &T) -> Result<Cursor<usize>>
    where
        T: PartialEq,
    {
        let window = self.window()?;
        let slice = window.slice()?;
        Ok(match slice.iter().position(|item| item == value) {
            Some(index) => Cursor::new(index, window.generation),
            None => Cursor::empty(slice.len(), window.generation),
        })
    }

    /// A range over the whole window
    pub fn range(&self) -> Result<Range<usize>> {
        let window = self.window()?;
        Ok(Range::new(0, window.len(), window.generation))
    }

    /// Returns true if `cursor` is non-empty, current, and inside the window
    pub fn belongs(&self, cursor: &Cursor<usize>) -> bool {
        !cursor.is_empty()
            && self.window().is_ok_and(|window| {
                window.generation == cursor.stamp() && *cursor.position() < window.len()
            })
    }

    fn stamped(&self, stamp: Generation) -> Result<()> {
        self.window()?.generation.check(stamp)
    }

    /// A copy of the element under `cursor`
    pub fn value(&self, cursor: &Cursor<usize>) -> Result<T>
    where
        T: Clone,
    {
        self.stamped(cursor.stamp())?;
        self.get(*cursor.occupied()?)
    }

    /// Advance `cursor`, which leaves it empty
    pub fn advance(&self, cursor: &mut Cursor<usize>) -> Result<()> {
        self.stamped(cursor.stamp())?;
        cursor.advance_with(|index| index + 1)
    }

    /// A copy of the first element of `range`
    pub fn front(&self, range: &Range<usize>) -> Result<T>
    where
        T: Clone,
    {
        self.stamped(range.stamp())?;
        self.get(*range.front_position()?)
    }

    /// A copy of the last element of `range`
    pub fn back(&self, range: &Range<usize>) -> Result<T>
    where
        T: Clone,
    {
        self.stamped(range.stamp())?;
        range.front_position()?;
        self.get(*range.end() - 1)
    }
}

impl<T> Default for ArrayView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for ArrayView<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}

impl<T> FromIterator<T> for ArrayView<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for ArrayView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.read(|slice| f.debug_list().entries(slice).finish()) {
            Ok(result) => result,
            Err(err) => write!(f, "<{err}>"),
        }
    }
}
