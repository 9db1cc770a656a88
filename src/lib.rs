//! # QSYNC Protocol
//!
//! **Q**ueue **SYNC**hronization
//!
//! QSYNC keeps one authoritative ordered queue on a server and lets many
//! remote observers maintain eventually-consistent local copies of it
//! without re-sending the whole list on every change. It provides:
//!
//! - **Deltas**: every mutation is a small, replayable operation with a
//!   closed set of action codes
//! - **Versioning**: a monotonic, gap-free version counter identifies every
//!   reachable queue state
//! - **Bounded history**: applied deltas are retained in a fixed-capacity
//!   log; older history is served as a full snapshot
//! - **Reconciliation**: any observer version deterministically maps to
//!   either a replay of its missed deltas or a snapshot
//! - **All-or-nothing mutation**: a rejected proposal leaves the queue and
//!   its log untouched
//!
//! ## Feature Flags
//!
//! - `service` (default): tokio single-writer actor over the authority,
//!   with a broadcast channel of applied deltas for observer fan-out
//!
//! ## Modules
//!
//! - [`core`]: constants, configuration, errors, and the media item type
//!   (always included)
//! - [`sync`]: the protocol core - deltas, the authoritative store, the
//!   bounded log, and reconciliation
//! - [`service`]: actor layer (requires `service` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use qsync_protocol::prelude::*;
//!
//! let mut authority = QueueAuthority::new(QueueConfig::default());
//!
//! // A peer proposes appending an item; the applied delta comes back
//! // with its fixed version for broadcast to the other observers.
//! let frame = Delta::Append {
//!     media: MediaItem::new("https://example.com/a.webm"),
//! }
//! .to_frame();
//! let applied = authority.propose(&frame).expect("append is valid");
//! assert_eq!(applied.version, 1);
//!
//! // An observer still at version 0 catches up by replaying the tail.
//! match authority.reconcile(0) {
//!     SyncPlan::Replay(deltas) => assert_eq!(deltas.len(), 1),
//!     SyncPlan::Snapshot(_) => unreachable!("history is still retained"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Sync layer (always included; it is the protocol)
pub mod sync;

// Actor service (feature-gated)
#[cfg(feature = "service")]
#[cfg_attr(docsrs, doc(cfg(feature = "service")))]
pub mod service;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use crate::core::*;

    // Sync types
    pub use crate::sync::*;

    // Service types (when enabled)
    #[cfg(feature = "service")]
    pub use crate::service::{QueueHandle, QueueService, ServiceError};
}

// Re-export commonly used items at crate root
pub use crate::core::{MediaItem, QueueConfig, RejectReason};
pub use crate::sync::{
    AdvanceOutcome, AppliedDelta, Delta, DeltaFrame, DeltaLog, QueueAuthority, QueueSnapshot,
    QueueStore, SharedQueue, SyncPlan,
};

#[cfg(feature = "service")]
pub use crate::service::{QueueHandle, QueueService, ServiceError};
