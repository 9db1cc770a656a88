//! Protocol constants.
//!
//! Action codes are fixed by the wire contract and MUST NOT be changed;
//! capacities are defaults that [`crate::core::QueueConfig`] can override.

// =============================================================================
// WIRE ACTION CODES
// =============================================================================

/// Exchange the items at two indexes.
pub const ACTION_SWAP: i32 = 0;

/// Remove the item at an index.
pub const ACTION_DELETE_AT: i32 = 1;

/// Relocate an item from one index to another.
pub const ACTION_MOVE_TO: i32 = 2;

/// Push an item to the end of the queue.
pub const ACTION_APPEND: i32 = 3;

/// Overwrite the item at an index.
pub const ACTION_REPLACE_AT: i32 = 4;

/// Full-queue snapshot. Synthesized by the reconciler only; never accepted
/// from a peer and never recorded in the log.
pub const ACTION_SNAPSHOT: i32 = 5;

/// Empty the queue.
pub const ACTION_CLEAR_ALL: i32 = 6;

// =============================================================================
// CAPACITY DEFAULTS
// =============================================================================

/// Default maximum number of applied deltas retained for replay.
pub const DEFAULT_LOG_CAPACITY: usize = 50;

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

/// Environment variable overriding the delta log capacity.
pub const ENV_LOG_CAPACITY: &str = "QSYNC_LOG_CAPACITY";

/// Environment variable overriding the maximum queue length.
pub const ENV_QUEUE_MAX_LENGTH: &str = "QSYNC_QUEUE_MAX_LENGTH";
