//! The error taxonomy shared by every lineage container

use core::fmt;

use crate::generation::Generation;

/// The result type used throughout the lineage crates
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Contract violations reported by containers, views, cursors and ranges
///
/// Lookups never produce an error: a missing element shows up as an empty
/// cursor or an end position, see the individual containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The handle was created under a generation that no longer matches
    /// its storage
    Stale {
        /// The generation the handle remembers
        cached: Generation,
        /// The generation of the storage right now, or `None` if the storage
        /// has been dropped altogether
        live: Option<Generation>,
    },
    /// Read, write or advance through an empty cursor, an empty range, or a
    /// position that never holds a value
    InvalidAccess {
        /// What was accessed
        what: &'static str,
    },
    /// Index or slice bounds outside the current length
    OutOfRange {
        /// Start of the requested span
        start: usize,
        /// End (exclusive) of the requested span
        end: usize,
        /// The length the span was checked against
        len: usize,
    },
}

impl Error {
    /// A single index that is not `< len`
    #[inline]
    pub const fn index(index: usize, len: usize) -> Self {
        Self::OutOfRange {
            start: index,
            end: index.saturating_add(1),
            len,
        }
    }

    /// Check that `start..end` lies within `0..len`
    #[inline]
    pub const fn check_span(start: usize, end: usize, len: usize) -> Result<()> {
        if start <= end && end <= len {
            Ok(())
        } else {
            Err(Self::OutOfRange { start, end, len })
        }
    }

    /// Check that `index < len`
    #[inline]
    pub const fn check_index(index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(Self::index(index, len))
        }
    }

    /// The storage a handle refers to no longer exists
    #[inline]
    pub const fn detached(cached: Generation) -> Self {
        Self::Stale { cached, live: None }
    }

    /// Is this [`Error::Stale`]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// Is this [`Error::InvalidAccess`]
    pub const fn is_invalid_access(&self) -> bool {
        matches!(self, Self::InvalidAccess { .. })
    }

    /// Is this [`Error::OutOfRange`]
    pub const fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Stale {
                cached,
                live: Some(live),
            } => write!(
                f,
                "stale handle, created at generation {cached} but storage is at {live}"
            ),
            Self::Stale { cached, live: None } => write!(
                f,
                "stale handle, storage seen at generation {cached} no longer exists"
            ),
            Self::InvalidAccess { what } => write!(f, "invalid access: {what}"),
            Self::OutOfRange { start, end, .. } if start > end => write!(
                f,
                "Range bounds out of order (start > end), start: {start}, end: {end}"
            ),
            Self::OutOfRange { start, end, len } if end == start.saturating_add(1) => write!(
                f,
                "Index out of bounds (index >= length), index: {start}, length: {len}"
            ),
            Self::OutOfRange { start, end, len } => write!(
                f,
                "Range out of bounds (end > length), range: {start}..{end}, length: {len}"
            ),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn span_checks() {
        assert_eq!(Error::check_span(0, 0, 0), Ok(()));
        assert_eq!(Error::check_span(1, 3, 3), Ok(()));
        assert!(Error::check_span(1, 4, 3).unwrap_err().is_out_of_range());
        assert!(Error::check_span(2, 1, 3).unwrap_err().is_out_of_range());
        assert!(Error::check_index(3, 3).is_err());
        assert!(Error::check_index(2, 3).is_ok());
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::index(4, 2).to_string(),
            "Index out of bounds (index >= length), index: 4, length: 2"
        );
        assert_eq!(
            Error::check_span(3, 1, 9).unwrap_err().to_string(),
            "Range bounds out of order (start > end), start: 3, end: 1"
        );
        assert_eq!(
            Error::InvalidAccess { what: "empty cursor" }.to_string(),
            "invalid access: empty cursor"
        );
    }
}
