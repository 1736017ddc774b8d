use std::sync::{Mutex, PoisonError};

use ulid::{Generator, Ulid};

/// Identifier of a published segment.
pub type SegmentId = Ulid;

/// Thread-safe ULID generator for segment ids.
pub struct SegmentIdGenerator {
    inner: Mutex<Generator>,
}

impl SegmentIdGenerator {
    /// Create a new generator seeded with the current time.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    /// Produce the next [`SegmentId`] in a monotonic, time-ordered sequence.
    ///
    /// Falls back to a fresh random id if the monotonic counter overflows
    /// within one millisecond.
    pub fn generate(&self) -> SegmentId {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.generate().unwrap_or_else(|_| Ulid::new())
    }
}

impl Default for SegmentIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
