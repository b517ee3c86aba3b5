//! Stale-result rejection for asynchronous refreshes.
//!
//! Every asynchronous refresh source (log tail polling, paste settling,
//! runtime activations) owns a [`SequenceGuard`]. A round of work captures
//! the guard's current value as its tag; when the result comes back it is
//! applied only if the tag still matches. Advancing the guard abandons every
//! in-flight round without cancelling anything explicitly.

/// Monotonic counter used to tag asynchronous rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceGuard {
    current: u64,
}

impl SequenceGuard {
    /// Create a guard starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tag a round started now would carry.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Invalidate all in-flight rounds and return the new tag.
    pub fn advance(&mut self) -> u64 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    /// Whether a result tagged with `tag` should still be applied.
    #[must_use]
    pub fn is_current(&self, tag: u64) -> bool {
        self.current == tag
    }
}
