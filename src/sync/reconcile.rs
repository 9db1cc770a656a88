//! Reconciliation: deciding what a lagging observer must receive.
//!
//! Every observer version deterministically maps to a plan - there is no
//! error outcome. An observer within the retained log span replays the
//! deltas it missed; anything else (history evicted, or a version the
//! authority never issued) is handed a full snapshot to replace its state
//! with.

use crate::core::constants::ACTION_SNAPSHOT;
use crate::core::error::RejectReason;

use super::delta::{AppliedDelta, DeltaFrame};
use super::engine::QueueAuthority;
use super::store::{QueueSnapshot, QueueStore};

/// What a reconciling observer must apply to converge on the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    /// Replay these deltas, in order, on top of the observer's own state.
    /// Empty when the observer is already up to date.
    Replay(Vec<AppliedDelta>),

    /// Replace local state wholesale; replay was impossible.
    Snapshot(QueueSnapshot),
}

impl SyncPlan {
    /// True when the observer was already up to date.
    pub fn is_noop(&self) -> bool {
        matches!(self, SyncPlan::Replay(deltas) if deltas.is_empty())
    }

    /// Apply this plan to an observer's local store, bringing it to the
    /// version the plan was computed at.
    pub fn apply_to(&self, store: &mut QueueStore) -> Result<(), RejectReason> {
        match self {
            SyncPlan::Replay(deltas) => {
                for applied in deltas {
                    store.apply(&applied.delta, None)?;
                }
                Ok(())
            }
            SyncPlan::Snapshot(snapshot) => {
                *store = QueueStore::restore(snapshot.clone());
                Ok(())
            }
        }
    }

    /// Render the plan as wire frames for the transport collaborator.
    ///
    /// A replay becomes one frame per delta in version order; a snapshot
    /// becomes a single frame carrying the full list and version.
    pub fn into_frames(self) -> Vec<DeltaFrame> {
        match self {
            SyncPlan::Replay(deltas) => deltas.iter().map(AppliedDelta::to_frame).collect(),
            SyncPlan::Snapshot(snapshot) => vec![snapshot.to_frame()],
        }
    }
}

impl QueueSnapshot {
    /// Render as the single wire frame an observer replaces its state with.
    pub fn to_frame(&self) -> DeltaFrame {
        DeltaFrame {
            items: Some(self.items.clone()),
            version: Some(self.version),
            ..DeltaFrame::new(ACTION_SNAPSHOT)
        }
    }
}

impl QueueAuthority {
    /// Compute what an observer at `client_version` must receive.
    ///
    /// - the observer claims a version ahead of the authority (stale or
    ///   buggy client): snapshot
    /// - the gap exceeds the retained log span (required versions were
    ///   evicted): snapshot
    /// - otherwise: replay of the log entries for versions
    ///   `(client_version, v]`, ascending; empty when already in sync
    pub fn reconcile(&self, client_version: u64) -> SyncPlan {
        let version = self.version();

        if client_version > version {
            log::debug!(
                "observer claims v{client_version}, ahead of authority v{version}; snapshotting"
            );
            return SyncPlan::Snapshot(self.snapshot());
        }

        let behind = version - client_version;
        if behind > self.delta_log().len() as u64 {
            log::debug!(
                "observer at v{client_version} lags {behind} with only {} retained; snapshotting",
                self.delta_log().len()
            );
            return SyncPlan::Snapshot(self.snapshot());
        }

        SyncPlan::Replay(self.delta_log().entries_since(client_version).cloned().collect())
    }

    /// Advisory distance between the authority and an observer.
    ///
    /// Positive when the observer lags, zero when in sync, negative when
    /// the observer claims a version the authority never issued. Callers
    /// use this to skip reconciliation entirely when it is zero.
    pub fn diff(&self, client_version: u64) -> i64 {
        self.version() as i64 - client_version as i64
    }
}
