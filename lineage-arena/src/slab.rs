//! A slab with generation-checked keys and manual reclamation
//!
//! Freed slots go onto an intrusive free list and are reused last-in first-out.
//! Every time a slot is emptied its [`SlotGeneration`] moves on, so a key to a
//! freed node never matches the slot's next occupant.

use core::{fmt, mem, ops};

use alloc::vec::Vec;

use crate::{
    generation::SlotGeneration,
    key::{matches_generation_failed, NodeKey},
    NodeAlloc,
};

// marks slots that were retired after exhausting their generation, they are
// never put back on the free list
const RETIRED: usize = usize::MAX;

enum Slot<T> {
    Empty {
        generation: SlotGeneration,
        next_free: usize,
    },
    Filled {
        generation: SlotGeneration,
        value: T,
    },
}

impl<T> Slot<T> {
    fn generation(&self) -> SlotGeneration {
        match *self {
            Slot::Empty { generation, .. } | Slot::Filled { generation, .. } => generation,
        }
    }

    fn value(&self, key: NodeKey) -> Option<&T> {
        match self {
            Slot::Filled { generation, value } if generation.matches(key.generation()) => {
                Some(value)
            }
            _ => None,
        }
    }

    fn value_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        match self {
            Slot::Filled { generation, value } if generation.matches(key.generation()) => {
                Some(value)
            }
            _ => None,
        }
    }
}

#[cold]
#[inline(never)]
fn corrupted_free_list(index: usize) -> ! {
    panic!("slab free list points at filled slot {index}")
}

/// Generation-checked storage with a free list
///
/// Insertion, access and removal are O(1). Iteration visits slots, not
/// elements, so it slows down after many removals.
pub struct Slab<T> {
    slots: Vec<Slot<T>>,
    next_free: usize,
    len: usize,
}

impl<T> Slab<T> {
    /// Create a new [`Slab`]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_free: 0,
            len: 0,
        }
    }

    /// Create a new [`Slab`] with room for `capacity` nodes before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            next_free: 0,
            len: 0,
        }
    }

    /// Get the number of elements in the [`Slab`]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no elements in the [`Slab`]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots, filled or not
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Insert a new value into the [`Slab`]
    pub fn insert(&mut self, value: T) -> NodeKey {
        let index = self.next_free;
        if index == self.slots.len() {
            self.slots.push(Slot::Empty {
                generation: SlotGeneration::EMPTY,
                next_free: index + 1,
            });
        }

        let slot = &mut self.slots[index];
        let (generation, next_free) = match *slot {
            Slot::Empty {
                generation,
                next_free,
            } => (generation.fill(), next_free),
            Slot::Filled { .. } => corrupted_free_list(index),
        };

        *slot = Slot::Filled { generation, value };
        self.next_free = next_free;
        self.len += 1;
        NodeKey::new(index, generation.get())
    }

    /// Get a reference to the value associated with the key
    ///
    /// Returns None if the key is dead
    pub fn get(&self, key: NodeKey) -> Option<&T> {
        self.slots.get(key.index())?.value(key)
    }

    /// Get a mutable reference to the value associated with the key
    ///
    /// Returns None if the key is dead
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        self.slots.get_mut(key.index())?.value_mut(key)
    }

    /// Returns true if the key refers to a live value
    pub fn contains(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    /// Try to remove the element associated with the key
    ///
    /// Returns None if the key is dead
    pub fn remove(&mut self, key: NodeKey) -> Option<T> {
        let index = key.index();
        let slot = self.slots.get_mut(index)?;
        slot.value(key)?;

        let empty = match slot.generation().try_empty() {
            Ok(generation) => {
                let empty = Slot::Empty {
                    generation,
                    next_free: self.next_free,
                };
                self.next_free = index;
                empty
            }
            Err(_) => {
                tracing::debug!(index, "retiring slab slot with an exhausted generation");
                Slot::Empty {
                    generation: SlotGeneration::EMPTY,
                    next_free: RETIRED,
                }
            }
        };

        self.len -= 1;
        match mem::replace(slot, empty) {
            Slot::Filled { value, .. } => Some(value),
            Slot::Empty { .. } => None,
        }
    }

    /// Remove every value
    ///
    /// Slots are kept and their generations move on, so every key issued so far
    /// goes dead.
    pub fn clear(&mut self) {
        let mut next_free = self.slots.len();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            let generation = match *slot {
                Slot::Filled { generation, .. } => generation.try_empty().ok(),
                Slot::Empty {
                    next_free: RETIRED, ..
                } => None,
                Slot::Empty { generation, .. } => Some(generation),
            };

            *slot = match generation {
                Some(generation) => {
                    let empty = Slot::Empty {
                        generation,
                        next_free,
                    };
                    next_free = index;
                    empty
                }
                None => Slot::Empty {
                    generation: SlotGeneration::EMPTY,
                    next_free: RETIRED,
                },
            };
        }

        self.next_free = next_free;
        self.len = 0;
    }

    /// The key of the value in slot `index`, if it is filled
    pub fn key_at(&self, index: usize) -> Option<NodeKey> {
        match self.slots.get(index)? {
            Slot::Filled { generation, .. } => Some(NodeKey::new(index, generation.get())),
            Slot::Empty { .. } => None,
        }
    }

    /// Get an iterator over the keys and references to elements of this slab
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slab<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> ops::Index<NodeKey> for Slab<T> {
    type Output = T;

    fn index(&self, key: NodeKey) -> &Self::Output {
        let slot = &self.slots[key.index()];
        match slot.value(key) {
            Some(value) => value,
            None => matches_generation_failed(slot.generation(), key),
        }
    }
}

impl<T> ops::IndexMut<NodeKey> for Slab<T> {
    fn index_mut(&mut self, key: NodeKey) -> &mut Self::Output {
        let slot = &mut self.slots[key.index()];
        let generation = slot.generation();
        match slot.value_mut(key) {
            Some(value) => value,
            None => matches_generation_failed(generation, key),
        }
    }
}

impl<T> NodeAlloc<T> for Slab<T> {
    fn allocate(&mut self, value: T) -> NodeKey {
        self.insert(value)
    }

    fn get(&self, key: NodeKey) -> Option<&T> {
        Slab::get(self, key)
    }

    fn get_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        Slab::get_mut(self, key)
    }

    fn requires_free(&self) -> bool {
        true
    }

    fn free(&mut self, key: NodeKey) -> Option<T> {
        self.remove(key)
    }

    fn reset(&mut self) {
        self.clear()
    }

    fn live(&self) -> usize {
        self.len
    }
}

/// Iterator over the live values of a [`Slab`], see [`Slab::iter`]
pub struct Iter<'a, T> {
    slots: core::iter::Enumerate<core::slice::Iter<'a, Slot<T>>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeKey, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|(index, slot)| match slot {
            Slot::Filled { generation, value } => {
                self.remaining -= 1;
                Some((NodeKey::new(index, generation.get()), value))
            }
            Slot::Empty { .. } => None,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
