//! ID generation utilities.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::SystemTime,
};

use ulid::{Generator, Ulid};

/// ID generator for entities.
///
/// Record IDs are lowercase ULIDs, so sorting by ID sorts by creation time
/// (at millisecond resolution). Stores use the ID as the last ordering key.
/// Clones share one monotonic sequence.
#[derive(Clone, Default)]
pub struct IdGenerator {
    sequence: Arc<Mutex<Generator>>,
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an ID stamped with the current time.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an ID stamped with `at`.
    ///
    /// Used when a record also stores its own timestamp so that ID order and
    /// timestamp order agree. IDs from one generator strictly increase, so
    /// records stamped in the same millisecond keep their insertion order.
    #[must_use]
    pub fn generate_at(&self, at: SystemTime) -> String {
        let mut sequence = self
            .sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Overflow needs 2^80 IDs in one millisecond.
        sequence
            .generate_from_datetime(at)
            .unwrap_or_else(|_| Ulid::from_datetime(at))
            .to_string()
            .to_lowercase()
    }
}
