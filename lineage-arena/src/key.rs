//! see [`NodeKey`]

use core::fmt;

use crate::generation::SlotGeneration;

/// A handle to a node in a [`NodeAlloc`](crate::NodeAlloc)
///
/// The generation is whatever the issuing allocator uses to tell occupants of
/// the same slot apart: the slot generation for a [`Slab`](crate::Slab), the
/// epoch for a [`Pool`](crate::Pool).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    index: u32,
    generation: u32,
}

#[cold]
#[inline(never)]
fn too_many_slots(index: usize) -> ! {
    panic!("tried to create an allocator with too many slots, index: {index}")
}

impl NodeKey {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        let Ok(index) = u32::try_from(index) else {
            too_many_slots(index)
        };

        Self { index, generation }
    }

    /// The slot this key points at
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// The generation this key was issued under
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({}v{})", self.index, self.generation)
    }
}

#[cold]
#[inline(never)]
pub(crate) fn matches_generation_failed(generation: SlotGeneration, key: NodeKey) -> ! {
    struct GenerationMatchFailed {
        generation: SlotGeneration,
        key: NodeKey,
    }

    impl fmt::Display for GenerationMatchFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.generation
                .write_mismatch(self.key.generation, self.key.index(), f)
        }
    }

    panic!("{}", GenerationMatchFailed { generation, key })
}
