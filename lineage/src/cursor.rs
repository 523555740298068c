//! Detached handles into a container: [`Cursor`] and [`Range`]
//!
//! Neither type borrows the container it came from. Both carry the
//! [`Generation`] of the container at the time they were produced, and the
//! container checks that stamp before it dereferences or removes through
//! them. Ask the container whether a handle `belongs` to it before removing
//! through it.

use crate::{error::Error, generation::Generation, Result};

const EMPTY_CURSOR: Error = Error::InvalidAccess {
    what: "empty cursor",
};

const EMPTY_RANGE: Error = Error::InvalidAccess {
    what: "empty range",
};

/// A possibly empty reference to a single element
///
/// A cursor is single-shot: advancing a non-empty cursor moves its position
/// to the successor and marks it empty, so it yields at most one element.
/// Reading or advancing an empty cursor is an [`Error::InvalidAccess`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor<P> {
    position: P,
    empty: bool,
    stamp: Generation,
}

impl<P> Cursor<P> {
    /// A cursor on the element at `position`
    #[inline]
    pub const fn new(position: P, stamp: Generation) -> Self {
        Self {
            position,
            empty: false,
            stamp,
        }
    }

    /// A cursor that refers to nothing, `position` is usually the container's
    /// end position
    #[inline]
    pub const fn empty(position: P, stamp: Generation) -> Self {
        Self {
            position,
            empty: true,
            stamp,
        }
    }

    /// Returns true if there is no element behind this cursor
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// The generation of the container when this cursor was produced
    #[inline]
    pub const fn stamp(&self) -> Generation {
        self.stamp
    }

    /// The raw position, regardless of emptiness
    #[inline]
    pub const fn position(&self) -> &P {
        &self.position
    }

    /// The position of the element, failing if the cursor is empty
    #[inline]
    pub fn occupied(&self) -> Result<&P> {
        if self.empty {
            Err(EMPTY_CURSOR)
        } else {
            Ok(&self.position)
        }
    }

    /// Move past the current element using `successor` and become empty
    pub fn advance_with(&mut self, successor: impl FnOnce(&P) -> P) -> Result<()> {
        if self.empty {
            return Err(EMPTY_CURSOR);
        }

        self.position = successor(&self.position);
        self.empty = true;
        Ok(())
    }

    /// Extract the raw position
    #[inline]
    pub fn into_position(self) -> P {
        self.position
    }
}

/// A bidirectional window `[begin, end)` over a container's positions
///
/// Both ends shrink independently. The range is empty once `begin == end`,
/// after which front and back access fail with [`Error::InvalidAccess`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range<P> {
    begin: P,
    end: P,
    stamp: Generation,
}

impl<P: PartialEq> Range<P> {
    /// A range over `[begin, end)`
    #[inline]
    pub const fn new(begin: P, end: P, stamp: Generation) -> Self {
        Self { begin, end, stamp }
    }

    /// Returns true if the range has no elements left
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// The first position of the range
    #[inline]
    pub const fn begin(&self) -> &P {
        &self.begin
    }

    /// The position one past the last element of the range
    #[inline]
    pub const fn end(&self) -> &P {
        &self.end
    }

    /// The generation of the container when this range was produced
    #[inline]
    pub const fn stamp(&self) -> Generation {
        self.stamp
    }

    /// The position of the first element, failing if the range is empty
    #[inline]
    pub fn front_position(&self) -> Result<&P> {
        if self.is_empty() {
            Err(EMPTY_RANGE)
        } else {
            Ok(&self.begin)
        }
    }

    /// Drop the first element using `successor` to find the new front
    pub fn shrink_front_with(&mut self, successor: impl FnOnce(&P) -> P) -> Result<()> {
        if self.is_empty() {
            return Err(EMPTY_RANGE);
        }

        self.begin = successor(&self.begin);
        Ok(())
    }

    /// Drop the last element using `predecessor` to find the new end
    pub fn shrink_back_with(&mut self, predecessor: impl FnOnce(&P) -> P) -> Result<()> {
        if self.is_empty() {
            return Err(EMPTY_RANGE);
        }

        self.end = predecessor(&self.end);
        Ok(())
    }

    /// Split the range into its ends
    #[inline]
    pub fn into_bounds(self) -> (P, P) {
        (self.begin, self.end)
    }
}
