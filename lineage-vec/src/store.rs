//! Shared storage and the per-view lineage record

use core::cell::{Cell, Ref, RefCell, RefMut};

use alloc::{
    rc::{Rc, Weak},
    vec::Vec,
};

use lineage::{Error, Generation, Result};

const BORROWED: Error = Error::InvalidAccess {
    what: "storage is in use by another view operation",
};

/// A buffer together with its authoritative generation
pub(crate) struct Store<T> {
    data: RefCell<Vec<T>>,
    generation: Cell<Generation>,
}

impl<T> Store<T> {
    pub(crate) fn new(data: Vec<T>, generation: Generation) -> Rc<Self> {
        Rc::new(Self {
            data: RefCell::new(data),
            generation: Cell::new(generation),
        })
    }

    pub(crate) fn generation(&self) -> Generation {
        self.generation.get()
    }

    pub(crate) fn bump(&self) {
        let mut generation = self.generation.get();
        generation.bump();
        self.generation.set(generation);
    }

    // user code runs while the buffer is borrowed, and may reach back into
    // a view on the same storage
    pub(crate) fn data(&self) -> Result<Ref<'_, Vec<T>>> {
        self.data.try_borrow().map_err(|_| BORROWED)
    }

    pub(crate) fn data_mut(&self) -> Result<RefMut<'_, Vec<T>>> {
        self.data.try_borrow_mut().map_err(|_| BORROWED)
    }
}

/// Where a view sits: its window, what it cached, and who it came from
///
/// `owned` is Some exactly when the view is an ancestor, in which case
/// `storage` points at the same store and `start..end` covers all of it.
/// `ancestry` holds every view this one was sliced through, nearest last, so
/// a removal still reaches the owner when views in between were dropped. It
/// is kept after a fork so views sliced earlier can still walk up to their
/// own ancestor.
pub(crate) struct Lineage<T> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) generation: Generation,
    pub(crate) owned: Option<Rc<Store<T>>>,
    pub(crate) storage: Weak<Store<T>>,
    pub(crate) ancestry: Vec<Weak<RefCell<Lineage<T>>>>,
}

impl<T> Lineage<T> {
    pub(crate) fn ancestor(
        store: Rc<Store<T>>,
        len: usize,
        ancestry: Vec<Weak<RefCell<Self>>>,
    ) -> Self {
        Self {
            start: 0,
            end: len,
            generation: store.generation(),
            storage: Rc::downgrade(&store),
            owned: Some(store),
            ancestry,
        }
    }

    pub(crate) fn is_ancestor(&self) -> bool {
        self.owned.is_some()
    }

    /// Is this the owner of `store`, or a descendant of it that was fresh as
    /// of `generation`
    pub(crate) fn tracks(&self, store: &Rc<Store<T>>, generation: Generation) -> bool {
        match &self.owned {
            Some(owned) => Rc::ptr_eq(owned, store),
            None => {
                self.generation == generation && Weak::ptr_eq(&self.storage, &Rc::downgrade(store))
            }
        }
    }
}

/// A validated snapshot of a view's window
pub(crate) struct Window<T> {
    pub(crate) store: Rc<Store<T>>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) generation: Generation,
}

impl<T> Window<T> {
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }

    pub(crate) fn slice(&self) -> Result<Ref<'_, [T]>> {
        let data = self.store.data()?;
        let len = data.len();
        Ref::filter_map(data, |data| data.get(self.start..self.end)).map_err(|_| {
            Error::OutOfRange {
                start: self.start,
                end: self.end,
                len,
            }
        })
    }

    pub(crate) fn slice_mut(&self) -> Result<RefMut<'_, [T]>> {
        let data = self.store.data_mut()?;
        let len = data.len();
        RefMut::filter_map(data, |data| data.get_mut(self.start..self.end)).map_err(|_| {
            Error::OutOfRange {
                start: self.start,
                end: self.end,
                len,
            }
        })
    }
}
