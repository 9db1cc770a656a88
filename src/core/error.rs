//! Error types for the QSYNC protocol core.

use thiserror::Error;

/// Why a proposed delta was rejected.
///
/// Every rejection is local and recoverable: the caller surfaces it to the
/// originating peer as a negative acknowledgment, and no other observer's
/// state changes. A rejected proposal never mutates the store or the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The frame is missing fields its action requires, carries fields the
    /// action forbids, or uses the reconciliation-only snapshot code.
    #[error("malformed delta: {0}")]
    MalformedDelta(&'static str),

    /// The action code is negative or not part of the protocol.
    #[error("unknown action code {0}")]
    UnknownActionCode(i32),

    /// An index argument does not address an element of the queue.
    #[error("index {index} out of range for queue of length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Queue length at validation time.
        len: usize,
    },

    /// The media payload lacks a usable url.
    #[error("media payload lacks a usable url")]
    MissingMedia,

    /// The queue is at its configured maximum length.
    #[error("queue is full (maximum length {0})")]
    QueueFull(usize),
}
