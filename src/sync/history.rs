//! Bounded append-only history of applied deltas.

use std::collections::VecDeque;

use super::delta::AppliedDelta;

/// Bounded FIFO log of applied deltas, indexed by version.
///
/// If the log holds `k` entries while the authority is at version `v`,
/// the entries are exactly versions `v - k + 1 ..= v`, ascending. Anything
/// older has been evicted and can only be served as a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaLog {
    entries: VecDeque<AppliedDelta>,
    capacity: usize,
}

impl DeltaLog {
    /// Create a log retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Append the next applied delta, evicting the oldest entry when the
    /// bound is exceeded. Versions must arrive strictly in order.
    pub fn push(&mut self, applied: AppliedDelta) {
        debug_assert!(
            self.entries
                .back()
                .is_none_or(|last| last.version + 1 == applied.version),
            "log versions must be contiguous"
        );

        self.entries.push_back(applied);
        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::trace!("evicted delta v{} from the log", evicted.version);
            }
        }
    }

    /// Number of retained entries - the replayable span.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured bound on retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest retained version, if any.
    pub fn oldest_version(&self) -> Option<u64> {
        self.entries.front().map(|entry| entry.version)
    }

    /// Latest retained version, if any.
    pub fn latest_version(&self) -> Option<u64> {
        self.entries.back().map(|entry| entry.version)
    }

    /// Retained entries with `version > since`, in ascending version order.
    pub fn entries_since(&self, since: u64) -> impl Iterator<Item = &AppliedDelta> {
        self.entries
            .iter()
            .filter(move |entry| entry.version > since)
    }
}
