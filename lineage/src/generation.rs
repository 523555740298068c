//! see [`Generation`]

use core::fmt;

use crate::error::Error;

/// A monotonically increasing counter owned by a storage owner
///
/// * the owner bumps it exactly once per structural mutation
/// * handles copy it when they are created and compare it before every use
/// * a mismatch means the handle may describe storage that has since moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

#[cold]
#[inline(never)]
fn generation_exhausted() -> ! {
    panic!("generation counter exhausted")
}

impl Generation {
    /// The generation every fresh storage owner starts at
    pub const INITIAL: Self = Self(0);

    /// Create a counter at [`Generation::INITIAL`]
    #[inline]
    pub const fn new() -> Self {
        Self::INITIAL
    }

    /// The raw counter value
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Advance to the next generation
    #[inline]
    pub fn bump(&mut self) {
        match self.0.checked_add(1) {
            Some(next) => self.0 = next,
            None => generation_exhausted(),
        }
    }

    /// Check a cached generation against this (live) one
    #[inline]
    pub fn check(self, cached: Generation) -> Result<(), Error> {
        if self == cached {
            Ok(())
        } else {
            Err(Error::Stale {
                cached,
                live: Some(self),
            })
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_is_monotonic() {
        let mut g = Generation::new();
        let before = g;
        g.bump();
        assert!(g > before);
        assert_eq!(g.get(), 1);
    }

    #[test]
    fn check_reports_both_sides() {
        let mut live = Generation::new();
        let cached = live;
        assert_eq!(live.check(cached), Ok(()));

        live.bump();
        assert_eq!(
            live.check(cached),
            Err(Error::Stale {
                cached,
                live: Some(live)
            })
        );
    }
}
