//! The authoritative queue state.

use serde::{Deserialize, Serialize};

use super::delta::Delta;
use crate::core::error::RejectReason;
use crate::core::media::MediaItem;

/// The ordered queue of media items plus its version counter.
///
/// Index 0 is the active ("now playing") item. The version counts the
/// deltas successfully applied since construction; it never decreases and
/// never skips. Observers hold their own `QueueStore` and converge on the
/// authority's by replaying deltas or restoring a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStore {
    items: Vec<MediaItem>,
    version: u64,
}

/// Full copy of the queue at a version, for observers that cannot replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Version the snapshot was taken at.
    pub version: u64,

    /// The complete queue contents, front first.
    pub items: Vec<MediaItem>,
}

impl QueueStore {
    /// Create an empty store at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot, adopting its version.
    pub fn restore(snapshot: QueueSnapshot) -> Self {
        Self {
            items: snapshot.items,
            version: snapshot.version,
        }
    }

    /// Current version: the count of deltas applied so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    /// The active item (front of the queue), if any.
    pub fn current(&self) -> Option<&MediaItem> {
        self.items.first()
    }

    /// All queued items, front first.
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Copy out the full list and version.
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            version: self.version,
            items: self.items.clone(),
        }
    }

    /// Semantically validate `delta` against the current state.
    ///
    /// Runs to completion before any mutation, so a rejection is always
    /// observed with the store untouched.
    pub fn check(&self, delta: &Delta, max_length: Option<usize>) -> Result<(), RejectReason> {
        match delta {
            Delta::Swap { a, b } => {
                self.check_index(*a)?;
                self.check_index(*b)?;
                if a == b {
                    return Err(RejectReason::MalformedDelta("swap indexes must differ"));
                }
            }
            Delta::DeleteAt { index } => self.check_index(*index)?,
            Delta::MoveTo { from, to } => {
                self.check_index(*from)?;
                self.check_index(*to)?;
                if from == to {
                    return Err(RejectReason::MalformedDelta("move indexes must differ"));
                }
            }
            Delta::Append { media } => {
                check_media(media)?;
                if let Some(max) = max_length {
                    if self.items.len() >= max {
                        return Err(RejectReason::QueueFull(max));
                    }
                }
            }
            Delta::ReplaceAt { index, media } => {
                self.check_index(*index)?;
                check_media(media)?;
            }
            Delta::ClearAll => {}
        }
        Ok(())
    }

    /// Validate and apply a delta, all-or-nothing.
    ///
    /// On success the store has mutated per the action's effect and the
    /// version has advanced by exactly one; the new version is returned.
    /// On rejection the store is bit-for-bit unchanged.
    pub fn apply(&mut self, delta: &Delta, max_length: Option<usize>) -> Result<u64, RejectReason> {
        self.check(delta, max_length)?;

        match delta {
            Delta::Swap { a, b } => self.items.swap(*a, *b),
            Delta::DeleteAt { index } => {
                self.items.remove(*index);
            }
            Delta::MoveTo { from, to } => {
                // `to` addresses a slot of the post-removal list; since
                // to < len and to != from, it is always insertable.
                let item = self.items.remove(*from);
                self.items.insert(*to, item);
            }
            Delta::Append { media } => self.items.push(media.clone()),
            Delta::ReplaceAt { index, media } => self.items[*index] = media.clone(),
            Delta::ClearAll => self.items.clear(),
        }

        self.version += 1;
        Ok(self.version)
    }

    fn check_index(&self, index: usize) -> Result<(), RejectReason> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(RejectReason::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

fn check_media(media: &MediaItem) -> Result<(), RejectReason> {
    if media.has_url() {
        Ok(())
    } else {
        Err(RejectReason::MissingMedia)
    }
}
