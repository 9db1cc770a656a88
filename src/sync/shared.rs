//! Lock-guarded shared handle over a queue authority.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::config::QueueConfig;
use crate::core::error::RejectReason;
use crate::core::media::MediaItem;

use super::delta::{AppliedDelta, DeltaFrame};
use super::engine::{AdvanceOutcome, QueueAuthority};
use super::reconcile::SyncPlan;
use super::store::QueueSnapshot;

/// Cloneable, thread-safe handle over a [`QueueAuthority`].
///
/// Writers hold the write lock for the full validate-apply-log sequence,
/// so every accepted delta gets a unique, gap-free version. Readers share
/// the read lock and always observe a consistent store/log/version
/// triple - a read can never interleave with a half-applied mutation.
#[derive(Debug, Clone)]
pub struct SharedQueue {
    inner: Arc<RwLock<QueueAuthority>>,
}

impl SharedQueue {
    /// Create a shared handle over a fresh authority.
    pub fn new(config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(QueueAuthority::new(config))),
        }
    }

    /// Validate and apply a proposed frame. See [`QueueAuthority::propose`].
    pub fn propose(&self, frame: &DeltaFrame) -> Result<AppliedDelta, RejectReason> {
        self.write().propose(frame)
    }

    /// Proceed to the next item. See [`QueueAuthority::advance`].
    pub fn advance(&self) -> AdvanceOutcome {
        self.write().advance()
    }

    /// Compute a sync plan for an observer. See [`QueueAuthority::reconcile`].
    pub fn reconcile(&self, client_version: u64) -> SyncPlan {
        self.read().reconcile(client_version)
    }

    /// Advisory version distance. See [`QueueAuthority::diff`].
    pub fn diff(&self, client_version: u64) -> i64 {
        self.read().diff(client_version)
    }

    /// The active item, if any.
    pub fn current_item(&self) -> Option<MediaItem> {
        self.read().current_item().cloned()
    }

    /// The item at `index`, if present.
    pub fn get(&self, index: usize) -> Option<MediaItem> {
        self.read().get(index).cloned()
    }

    /// Full copy of the list plus version.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.read().snapshot()
    }

    /// Current authoritative version.
    pub fn version(&self) -> u64 {
        self.read().version()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Mutation validates in full before touching state, so the authority
    // behind a poisoned lock is still consistent; recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, QueueAuthority> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, QueueAuthority> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
