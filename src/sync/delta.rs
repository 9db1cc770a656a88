//! Delta frames and the validated mutation union.
//!
//! A mutation travels as an untrusted [`DeltaFrame`] and is checked in two
//! deliberate phases: *structural* validation (the fields match the action
//! code) happens at construction via [`Delta::from_frame`]; *semantic*
//! validation (indexes in range, media usable) happens at apply time
//! against the live queue, inside the authority. A frame that parses into
//! a [`Delta`] can therefore still be rejected when applied.

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    ACTION_APPEND, ACTION_CLEAR_ALL, ACTION_DELETE_AT, ACTION_MOVE_TO, ACTION_REPLACE_AT,
    ACTION_SNAPSHOT, ACTION_SWAP,
};
use crate::core::error::RejectReason;
use crate::core::media::MediaItem;

/// Wire shape of a mutation request.
///
/// Frames are what peers actually send; nothing in a frame is trusted
/// until it has passed both validation phases. The `items` and `version`
/// fields are populated only on snapshot frames the reconciler
/// synthesizes; a frame arriving with either set is rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaFrame {
    /// Action code (see [`crate::core::constants`]).
    pub action: i32,

    /// Index arguments for the action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<u32>,

    /// Media payload for the append and replace actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaItem>,

    /// Full queue contents (snapshot frames only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<MediaItem>>,

    /// Authoritative version (snapshot frames only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl DeltaFrame {
    /// Frame carrying only an action code.
    pub fn new(action: i32) -> Self {
        Self {
            action,
            indexes: Vec::new(),
            media: None,
            items: None,
            version: None,
        }
    }
}

/// A structurally valid mutation, one variant per wire action.
///
/// `Snapshot` is deliberately absent: snapshots exist only as
/// reconciliation payloads and are never constructed from a frame nor
/// recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// Exchange the items at `a` and `b`.
    Swap {
        /// First index.
        a: usize,
        /// Second index, distinct from `a`.
        b: usize,
    },
    /// Remove the item at `index`.
    DeleteAt {
        /// Index to remove.
        index: usize,
    },
    /// Relocate the item at `from` so it lands at `to`.
    MoveTo {
        /// Index the item is taken from.
        from: usize,
        /// Index it is reinserted at, after removal.
        to: usize,
    },
    /// Push `media` to the end of the queue.
    Append {
        /// The item to enqueue.
        media: MediaItem,
    },
    /// Overwrite the item at `index` with `media`.
    ReplaceAt {
        /// Index to overwrite.
        index: usize,
        /// The replacement item.
        media: MediaItem,
    },
    /// Empty the queue.
    ClearAll,
}

impl Delta {
    /// Structurally validate a frame.
    ///
    /// Enforces exactly the fields the action requires: exact index arity,
    /// a media payload only where the action consumes one, and snapshot
    /// fields never present on input. Queue state is not consulted here;
    /// an in-range-looking index can still be rejected at apply time.
    pub fn from_frame(frame: &DeltaFrame) -> Result<Self, RejectReason> {
        if frame.items.is_some() || frame.version.is_some() {
            return Err(RejectReason::MalformedDelta(
                "snapshot fields on a proposed delta",
            ));
        }

        let delta = match frame.action {
            ACTION_SWAP => {
                no_media(frame)?;
                let (a, b) = index_pair(&frame.indexes)?;
                Delta::Swap { a, b }
            }
            ACTION_DELETE_AT => {
                no_media(frame)?;
                Delta::DeleteAt {
                    index: index_one(&frame.indexes)?,
                }
            }
            ACTION_MOVE_TO => {
                no_media(frame)?;
                let (from, to) = index_pair(&frame.indexes)?;
                Delta::MoveTo { from, to }
            }
            ACTION_APPEND => {
                no_indexes(&frame.indexes)?;
                Delta::Append {
                    media: require_media(frame)?,
                }
            }
            ACTION_REPLACE_AT => Delta::ReplaceAt {
                index: index_one(&frame.indexes)?,
                media: require_media(frame)?,
            },
            ACTION_SNAPSHOT => {
                return Err(RejectReason::MalformedDelta(
                    "snapshots are reconciliation-only",
                ));
            }
            ACTION_CLEAR_ALL => {
                no_media(frame)?;
                no_indexes(&frame.indexes)?;
                Delta::ClearAll
            }
            code => return Err(RejectReason::UnknownActionCode(code)),
        };

        Ok(delta)
    }

    /// Wire action code for this delta.
    pub fn action_code(&self) -> i32 {
        match self {
            Delta::Swap { .. } => ACTION_SWAP,
            Delta::DeleteAt { .. } => ACTION_DELETE_AT,
            Delta::MoveTo { .. } => ACTION_MOVE_TO,
            Delta::Append { .. } => ACTION_APPEND,
            Delta::ReplaceAt { .. } => ACTION_REPLACE_AT,
            Delta::ClearAll => ACTION_CLEAR_ALL,
        }
    }

    /// Render the delta as a wire frame.
    pub fn to_frame(&self) -> DeltaFrame {
        let mut frame = DeltaFrame::new(self.action_code());
        match self {
            Delta::Swap { a, b } => frame.indexes = vec![*a as u32, *b as u32],
            Delta::DeleteAt { index } => frame.indexes = vec![*index as u32],
            Delta::MoveTo { from, to } => frame.indexes = vec![*from as u32, *to as u32],
            Delta::Append { media } => frame.media = Some(media.clone()),
            Delta::ReplaceAt { index, media } => {
                frame.indexes = vec![*index as u32];
                frame.media = Some(media.clone());
            }
            Delta::ClearAll => {}
        }
        frame
    }
}

impl TryFrom<&DeltaFrame> for Delta {
    type Error = RejectReason;

    fn try_from(frame: &DeltaFrame) -> Result<Self, Self::Error> {
        Delta::from_frame(frame)
    }
}

/// A delta together with the version its application produced.
///
/// This is both the unit stored in the delta log and the success payload
/// returned to the proposing caller for broadcast to the other observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDelta {
    /// Version the authority reached by applying `delta`.
    pub version: u64,

    /// The applied mutation.
    pub delta: Delta,
}

impl AppliedDelta {
    /// Render as a wire frame.
    pub fn to_frame(&self) -> DeltaFrame {
        self.delta.to_frame()
    }
}

fn index_one(indexes: &[u32]) -> Result<usize, RejectReason> {
    match indexes {
        [index] => Ok(*index as usize),
        _ => Err(RejectReason::MalformedDelta(
            "action requires exactly one index",
        )),
    }
}

fn index_pair(indexes: &[u32]) -> Result<(usize, usize), RejectReason> {
    match indexes {
        [a, b] => Ok((*a as usize, *b as usize)),
        _ => Err(RejectReason::MalformedDelta(
            "action requires exactly two indexes",
        )),
    }
}

fn no_indexes(indexes: &[u32]) -> Result<(), RejectReason> {
    if indexes.is_empty() {
        Ok(())
    } else {
        Err(RejectReason::MalformedDelta("action takes no indexes"))
    }
}

fn no_media(frame: &DeltaFrame) -> Result<(), RejectReason> {
    if frame.media.is_none() {
        Ok(())
    } else {
        Err(RejectReason::MalformedDelta(
            "media payload on an index-only action",
        ))
    }
}

fn require_media(frame: &DeltaFrame) -> Result<MediaItem, RejectReason> {
    frame
        .media
        .clone()
        .ok_or(RejectReason::MalformedDelta("action requires a media payload"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> MediaItem {
        MediaItem::new("https://example.com/a.webm")
    }

    #[test]
    fn test_each_action_parses() {
        let swap = DeltaFrame {
            indexes: vec![1, 3],
            ..DeltaFrame::new(ACTION_SWAP)
        };
        assert_eq!(Delta::from_frame(&swap).unwrap(), Delta::Swap { a: 1, b: 3 });

        let delete = DeltaFrame {
            indexes: vec![0],
            ..DeltaFrame::new(ACTION_DELETE_AT)
        };
        assert_eq!(
            Delta::from_frame(&delete).unwrap(),
            Delta::DeleteAt { index: 0 }
        );

        let mv = DeltaFrame {
            indexes: vec![8, 0],
            ..DeltaFrame::new(ACTION_MOVE_TO)
        };
        assert_eq!(
            Delta::from_frame(&mv).unwrap(),
            Delta::MoveTo { from: 8, to: 0 }
        );

        let append = DeltaFrame {
            media: Some(media()),
            ..DeltaFrame::new(ACTION_APPEND)
        };
        assert_eq!(
            Delta::from_frame(&append).unwrap(),
            Delta::Append { media: media() }
        );

        let replace = DeltaFrame {
            indexes: vec![2],
            media: Some(media()),
            ..DeltaFrame::new(ACTION_REPLACE_AT)
        };
        assert_eq!(
            Delta::from_frame(&replace).unwrap(),
            Delta::ReplaceAt {
                index: 2,
                media: media()
            }
        );

        let clear = DeltaFrame::new(ACTION_CLEAR_ALL);
        assert_eq!(Delta::from_frame(&clear).unwrap(), Delta::ClearAll);
    }

    #[test]
    fn test_unknown_and_negative_codes_reject() {
        for code in [-2, -1, 7, 100] {
            let result = Delta::from_frame(&DeltaFrame::new(code));
            assert_eq!(result, Err(RejectReason::UnknownActionCode(code)));
        }
    }

    #[test]
    fn test_snapshot_code_rejected_on_input() {
        let frame = DeltaFrame::new(ACTION_SNAPSHOT);
        assert!(matches!(
            Delta::from_frame(&frame),
            Err(RejectReason::MalformedDelta(_))
        ));
    }

    #[test]
    fn test_snapshot_fields_rejected_on_input() {
        let frame = DeltaFrame {
            items: Some(vec![media()]),
            ..DeltaFrame::new(ACTION_CLEAR_ALL)
        };
        assert!(matches!(
            Delta::from_frame(&frame),
            Err(RejectReason::MalformedDelta(_))
        ));

        let frame = DeltaFrame {
            version: Some(3),
            ..DeltaFrame::new(ACTION_CLEAR_ALL)
        };
        assert!(matches!(
            Delta::from_frame(&frame),
            Err(RejectReason::MalformedDelta(_))
        ));
    }

    #[test]
    fn test_wrong_arity_rejects() {
        // Swap with one index
        let frame = DeltaFrame {
            indexes: vec![1],
            ..DeltaFrame::new(ACTION_SWAP)
        };
        assert!(Delta::from_frame(&frame).is_err());

        // Delete with none
        assert!(Delta::from_frame(&DeltaFrame::new(ACTION_DELETE_AT)).is_err());

        // Append with stray indexes
        let frame = DeltaFrame {
            indexes: vec![0],
            media: Some(media()),
            ..DeltaFrame::new(ACTION_APPEND)
        };
        assert!(Delta::from_frame(&frame).is_err());

        // Clear with indexes
        let frame = DeltaFrame {
            indexes: vec![0],
            ..DeltaFrame::new(ACTION_CLEAR_ALL)
        };
        assert!(Delta::from_frame(&frame).is_err());
    }

    #[test]
    fn test_media_presence_enforced() {
        // Append without media
        assert_eq!(
            Delta::from_frame(&DeltaFrame::new(ACTION_APPEND)),
            Err(RejectReason::MalformedDelta("action requires a media payload"))
        );

        // Swap with a media payload
        let frame = DeltaFrame {
            indexes: vec![0, 1],
            media: Some(media()),
            ..DeltaFrame::new(ACTION_SWAP)
        };
        assert!(Delta::from_frame(&frame).is_err());
    }

    #[test]
    fn test_empty_url_is_structurally_valid() {
        // The url check is semantic; construction lets it through.
        let frame = DeltaFrame {
            media: Some(MediaItem::new("")),
            ..DeltaFrame::new(ACTION_APPEND)
        };
        assert!(Delta::from_frame(&frame).is_ok());
    }

    #[test]
    fn test_frame_roundtrip() {
        let deltas = [
            Delta::Swap { a: 1, b: 3 },
            Delta::DeleteAt { index: 0 },
            Delta::MoveTo { from: 8, to: 0 },
            Delta::Append { media: media() },
            Delta::ReplaceAt {
                index: 2,
                media: media(),
            },
            Delta::ClearAll,
        ];
        for delta in deltas {
            let frame = delta.to_frame();
            assert_eq!(Delta::from_frame(&frame).unwrap(), delta);
        }
    }

    #[test]
    fn test_frame_wire_shape() {
        let frame = Delta::Swap { a: 1, b: 3 }.to_frame();
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"action":0,"indexes":[1,3]}"#);

        let parsed: DeltaFrame = serde_json::from_str(r#"{"action":3,"media":{"url":"a"}}"#).unwrap();
        assert_eq!(
            Delta::from_frame(&parsed).unwrap(),
            Delta::Append {
                media: MediaItem::new("a")
            }
        );
    }
}
