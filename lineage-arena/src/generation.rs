//! Slot generations: they track whether a slot is filled, and how many times it
//! has been emptied, so keys to an earlier occupant can be told apart
//!
//! see [`SlotGeneration`] for details

use core::fmt;

/// The generation of a single slab slot
///
/// The lifetime of a slot is modeled like this
///
/// * every slot starts off empty, at [`SlotGeneration::EMPTY`]
/// * filling an empty slot moves it to the next generation via
///   [`SlotGeneration::fill`], which always succeeds
/// * emptying a filled slot goes through [`SlotGeneration::try_empty`]
///     * if this succeeds, the new generation is used for the slot
///     * if it fails the counter is exhausted; the slot must be set to
///       [`SlotGeneration::EMPTY`] and discarded, never to be filled again
/// * a key remembers the filled generation, and [`SlotGeneration::matches`]
///   tells whether the slot still holds that occupant
///
/// Even values are empty, odd values are filled.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(kani, derive(kani::Arbitrary))]
pub struct SlotGeneration(u32);

/// Returned by [`SlotGeneration::try_empty`] once a slot has been emptied as many
/// times as the counter can express
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

impl SlotGeneration {
    /// The initial generation, which is guaranteed to be empty
    pub const EMPTY: Self = Self(0);

    /// The raw counter
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if the generation is in the empty state
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 & 1 == 0
    }

    /// Check if the generation is in the filled state
    #[inline]
    pub const fn is_filled(self) -> bool {
        !self.is_empty()
    }

    /// The generation after filling this (empty) slot
    #[inline]
    pub const fn fill(self) -> Self {
        debug_assert!(self.is_empty());
        // an empty generation is even, so it is at most `u32::MAX - 1`
        Self(self.0 | 1)
    }

    /// The generation after emptying this (filled) slot
    #[inline]
    pub const fn try_empty(self) -> Result<Self, Exhausted> {
        debug_assert!(self.is_filled());
        match self.0.checked_add(1) {
            Some(next) => Ok(Self(next)),
            None => Err(Exhausted),
        }
    }

    /// Check if this generation is filled with the occupant a key was made for
    #[inline]
    pub const fn matches(self, filled: u32) -> bool {
        self.is_filled() && self.0 == filled
    }

    /// Writes the error of a failed `matches`
    pub fn write_mismatch(self, filled: u32, index: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "tried to access an empty slot at index {index}")
        } else {
            write!(
                f,
                "tried to access slot {index} with generation {filled}, but it is at generation {}",
                self.0
            )
        }
    }
}

#[cfg(kani)]
#[kani::proof]
fn proof_slot_generation() {
    let g = kani::any::<SlotGeneration>();
    let filled = kani::any::<u32>();

    assert!(SlotGeneration::EMPTY.is_empty());
    assert!(g.is_empty() != g.is_filled());

    if g.is_empty() {
        assert!(g.fill().is_filled());
    } else {
        assert!(g.matches(g.get()));
        if let Ok(next) = g.try_empty() {
            assert!(next.is_empty());
        }
    }

    if g.matches(filled) {
        assert!(g.is_filled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let g = SlotGeneration::EMPTY;
        assert!(g.is_empty());

        let filled = g.fill();
        assert!(filled.matches(filled.get()));

        let emptied = filled.try_empty().unwrap();
        assert!(emptied.is_empty());
        assert!(!emptied.matches(filled.get()));

        let refilled = emptied.fill();
        assert!(!refilled.matches(filled.get()));
    }

    #[test]
    fn exhaustion() {
        let last = SlotGeneration(u32::MAX);
        assert!(last.is_filled());
        assert_eq!(last.try_empty(), Err(Exhausted));
    }
}
