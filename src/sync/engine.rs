//! The mutation engine: validate, apply, log.

use crate::core::config::QueueConfig;
use crate::core::error::RejectReason;
use crate::core::media::MediaItem;

use super::delta::{AppliedDelta, Delta, DeltaFrame};
use super::history::DeltaLog;
use super::store::{QueueSnapshot, QueueStore};

/// Outcome of [`QueueAuthority::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The front item was removed; broadcast the applied delta.
    Advanced(AppliedDelta),

    /// Only one item remains, so nothing changed; re-announce this item
    /// as still active.
    StillCurrent(MediaItem),

    /// The queue is empty; there is nothing to advance to.
    Empty,
}

/// The single authority over one replicated queue.
///
/// Owns the store, the delta log, and the version counter as one unit of
/// state; every successful apply is the sole mutator of all three. The
/// caller is responsible for serializing mutation - either behind
/// [`super::SharedQueue`]'s write lock or inside the `service` actor -
/// which is what gives every accepted delta a unique, gap-free version.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueAuthority {
    store: QueueStore,
    log: DeltaLog,
    config: QueueConfig,
}

impl QueueAuthority {
    /// Create an empty authority at version 0.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            store: QueueStore::new(),
            log: DeltaLog::new(config.log_capacity),
            config,
        }
    }

    /// Validate a proposed frame and, if acceptable, apply it.
    ///
    /// Structural validation runs first (fields match the action code;
    /// the snapshot code is always refused here), then semantic validation
    /// against the live queue, then the mutation, version bump, and log
    /// append. A rejection at any phase leaves store and log untouched.
    pub fn propose(&mut self, frame: &DeltaFrame) -> Result<AppliedDelta, RejectReason> {
        let result = Delta::from_frame(frame).and_then(|delta| self.apply(delta));
        if let Err(reason) = &result {
            log::warn!("rejected proposal (action {}): {reason}", frame.action);
        }
        result
    }

    /// Apply an already-structurally-valid delta.
    ///
    /// Runs semantic validation and the all-or-nothing mutation. Used by
    /// [`propose`](Self::propose) and by [`advance`](Self::advance)'s
    /// pop-front primitive.
    pub fn apply(&mut self, delta: Delta) -> Result<AppliedDelta, RejectReason> {
        let version = self.store.apply(&delta, self.config.max_length)?;
        let applied = AppliedDelta { version, delta };
        self.log.push(applied.clone());
        log::debug!(
            "applied delta v{version}: action {}",
            applied.delta.action_code()
        );
        Ok(applied)
    }

    /// Proceed to the next item.
    ///
    /// Popping the front is the dominant real-world transition, so it gets
    /// an explicit race-free primitive instead of every caller rebuilding
    /// it from [`propose`](Self::propose):
    ///
    /// - more than one item queued: removes the front, exactly as a
    ///   `DeleteAt` of index 0 would
    /// - exactly one item: no mutation; the outcome carries the current
    ///   item so the caller can re-announce it as still active
    /// - empty: no mutation, nothing to report
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.store.len() > 1 {
            match self.apply(Delta::DeleteAt { index: 0 }) {
                Ok(applied) => AdvanceOutcome::Advanced(applied),
                // Index 0 of a multi-item queue is always in range.
                Err(_) => AdvanceOutcome::Empty,
            }
        } else {
            match self.store.current() {
                Some(item) => AdvanceOutcome::StillCurrent(item.clone()),
                None => AdvanceOutcome::Empty,
            }
        }
    }

    /// Current authoritative version.
    pub fn version(&self) -> u64 {
        self.store.version()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The active item (front of the queue), if any.
    pub fn current_item(&self) -> Option<&MediaItem> {
        self.store.current()
    }

    /// The item at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.store.get(index)
    }

    /// Full copy of the list plus version, for greeting a new observer.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.store.snapshot()
    }

    /// The configuration this authority runs with.
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub(super) fn delta_log(&self) -> &DeltaLog {
        &self.log
    }
}
