//! In-memory view accounting
//!
//! Reads bump a counter here instead of writing to the database. The
//! aggregator drains the counters periodically and flushes them in one batch.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Per-note view deltas accumulated since the last drain
///
/// One instance is constructed at startup and shared (via `Arc`) by the note
/// service and the aggregator. The lock is only held for map updates, never
/// across I/O.
#[derive(Debug, Default)]
pub struct ViewCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl ViewCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one view of `id` and returns its undrained count, this view
    /// included
    ///
    /// Both happen under one lock, so a concurrent drain either takes this
    /// view along or leaves it in the returned count.
    pub fn increment(&self, id: &str) -> u64 {
        let mut counts = self.lock();
        if let Some(count) = counts.get_mut(id) {
            *count = count.saturating_add(1);
            return *count;
        }
        counts.insert(id.to_string(), 1);
        1
    }

    /// Views of `id` recorded but not yet drained
    pub fn pending(&self, id: &str) -> u64 {
        self.lock().get(id).copied().unwrap_or(0)
    }

    /// Takes every accumulated delta and resets the counters
    ///
    /// The map is swapped out under the lock, so an increment racing with a
    /// drain lands either in this snapshot or in the next one, never in both.
    pub fn drain_dirty(&self) -> HashMap<String, u64> {
        std::mem::take(&mut *self.lock())
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
