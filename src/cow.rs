//! Ownership tokens for copy-on-write.
//!
//! Every node records the token of the handle that created it. A handle may
//! only write to a node carrying its own token; anything else is copied first.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COW: AtomicU64 = AtomicU64::new(1);

/// Opaque tracker identity. Never reused within a process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Cow(u64);

impl Cow {
    pub(crate) fn new() -> Self {
        Self(NEXT_COW.fetch_add(1, Ordering::Relaxed))
    }
}

/// The tracker slot of a tree handle.
///
/// `Clone for CowTree` only has `&self`, yet has to retire the source
/// handle's tracker too, so the slot is atomic. Writers hold `&mut` and read
/// it through `get_mut`.
#[derive(Debug)]
pub(crate) struct Tracker(AtomicU64);

impl Tracker {
    pub(crate) fn new() -> Self {
        Self(AtomicU64::new(Cow::new().0))
    }

    /// Current token, for a handle that is about to write.
    #[inline]
    pub(crate) fn get_mut(&mut self) -> Cow {
        Cow(*self.0.get_mut())
    }

    /// Replace the token so no existing node counts as privately owned.
    pub(crate) fn retire(&self) {
        self.0.store(Cow::new().0, Ordering::Relaxed);
    }

    pub(crate) fn reset(&mut self) {
        *self.0.get_mut() = Cow::new().0;
    }
}
