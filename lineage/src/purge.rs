//! The purge protocol: one pass that visits every element and removes the ones
//! the predicate flags
//!
//! A predicate is called once per element, in container order, with a removal
//! flag (initially `false`) and the element. Setting the flag removes the
//! element. Returning [`ControlFlow::Break`] stops after the current element.
//!
//! Regardless of how the traversal ends (completion, break, predicate error or
//! panic) the container is left consistent:
//!
//! * surviving elements keep their relative order
//! * every visited element that was flagged is gone
//! * every unvisited element is still present and unchanged
//!
//! Two drivers implement the protocol:
//!
//! * [`compact`] for packed arrays: a single forward pass with a trailing write
//!   index that moves each survivor at most once
//! * [`purge_positions`] for engines that remove by position and hand back the
//!   successor

use core::{ops::ControlFlow, ptr};

use alloc::vec::Vec;
use scopeguard::ScopeGuard;

use crate::engine::Engine;

/// What a purge predicate returns: keep going, or stop after this element
pub type Flow = ControlFlow<()>;

/// Keep visiting
pub const CONTINUE: Flow = ControlFlow::Continue(());

/// Stop after the current element
pub const STOP: Flow = ControlFlow::Break(());

/// A summary of a finished purge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Purged {
    /// Elements the predicate returned for
    pub visited: usize,
    /// Elements removed
    pub removed: usize,
    /// Survivors that had to be moved to close a gap
    pub relocated: usize,
    /// False if the predicate stopped the traversal early
    pub finished: bool,
}

struct Compaction<'a, T> {
    vec: &'a mut Vec<T>,
    read: usize,
    write: usize,
    len: usize,
}

impl<T> Compaction<'_, T> {
    // shifts everything that was never visited down onto the write index and
    // restores the length
    fn close(self) {
        let tail = self.len - self.read;
        let base = self.vec.as_mut_ptr();

        if self.read != self.write && tail != 0 {
            // SAFETY: `read..len` are initialized and untouched, `write <= read`
            // so the destination lies inside the allocation. `ptr::copy` allows
            // the overlap.
            unsafe { ptr::copy(base.add(self.read), base.add(self.write), tail) }
        }

        // SAFETY: `..write` holds the compacted survivors, followed by the `tail`
        // elements just moved
        unsafe { self.vec.set_len(self.write + tail) }
    }
}

/// Purge `vec[span]` in place
///
/// Before the first removal the read and write indices coincide and nothing
/// moves. After it, each surviving element is moved into the write slot exactly
/// once; removed elements are dropped where they are and never moved.
/// Elements after `span.end` are shifted down once at the end.
///
/// If `visit` fails the failing element is kept, everything visited before it
/// has already been settled, and the error is returned. A panic in `visit`
/// leaves the vector in the same shape.
///
/// # Panics
///
/// if `span` is not within `0..vec.len()`
pub fn compact<T, E>(
    vec: &mut Vec<T>,
    span: core::ops::Range<usize>,
    mut visit: impl FnMut(&mut bool, &mut T) -> Result<Flow, E>,
) -> Result<Purged, E> {
    assert!(
        span.start <= span.end && span.end <= vec.len(),
        "purge span {span:?} out of bounds of length {}",
        vec.len()
    );

    let len = vec.len();
    // SAFETY: the guard below owns `span.start..len` until `close` restores the
    // length, so a panic never exposes a moved-from or dropped slot
    unsafe { vec.set_len(span.start) };

    let mut state = scopeguard::guard(
        Compaction {
            vec,
            read: span.start,
            write: span.start,
            len,
        },
        Compaction::close,
    );

    let mut purged = Purged::default();
    let mut outcome = Ok(());

    while state.read < span.end {
        let base = state.vec.as_mut_ptr();
        let read = state.read;
        let mut remove = false;

        // SAFETY: `read < len` and the slot has neither been moved nor dropped
        let flow = match visit(&mut remove, unsafe { &mut *base.add(read) }) {
            Ok(flow) => flow,
            Err(err) => {
                outcome = Err(err);
                break;
            }
        };

        purged.visited += 1;

        if remove {
            // advance first, so a panicking destructor leaves the slot in the gap
            state.read += 1;
            purged.removed += 1;
            // SAFETY: the slot is initialized and is now outside both the
            // survivors and the unvisited tail
            unsafe { ptr::drop_in_place(base.add(read)) };
        } else {
            if read != state.write {
                // SAFETY: `write < read`, both are in bounds, and the write slot is
                // part of the gap so nothing live is overwritten
                unsafe { ptr::copy_nonoverlapping(base.add(read), base.add(state.write), 1) };
                purged.relocated += 1;
            }
            state.read += 1;
            state.write += 1;
        }

        if flow.is_break() {
            break;
        }
    }

    purged.finished = outcome.is_ok() && state.read == span.end;
    Compaction::close(ScopeGuard::into_inner(state));

    tracing::trace!(
        visited = purged.visited,
        removed = purged.removed,
        relocated = purged.relocated,
        "compacted array span"
    );

    outcome.map(|()| purged)
}

/// Purge `[begin, end)` of an engine, removing flagged elements through
/// [`Engine::remove`] and continuing from the position it returns
///
/// `visit` gets the engine and the current position so adapters can hand out
/// whatever view of the element suits them. If `visit` fails, removals already
/// made stand and nothing after the failing position is touched.
pub fn purge_positions<E: Engine, X>(
    engine: &mut E,
    begin: E::Position,
    end: &E::Position,
    mut visit: impl FnMut(&mut E, &E::Position, &mut bool) -> Result<Flow, X>,
) -> Result<Purged, X> {
    let mut purged = Purged::default();
    let mut position = begin;
    let last = engine.end();

    while position != *end && position != last {
        let mut remove = false;
        let flow = visit(engine, &position, &mut remove)?;
        purged.visited += 1;

        position = if remove {
            purged.removed += 1;
            engine.remove(&position)
        } else {
            engine.next(&position)
        };

        if flow.is_break() {
            return Ok(purged);
        }
    }

    purged.finished = true;
    tracing::trace!(
        visited = purged.visited,
        removed = purged.removed,
        "purged engine positions"
    );
    Ok(purged)
}
