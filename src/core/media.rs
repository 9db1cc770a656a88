//! The media item value type held in the queue.

use serde::{Deserialize, Serialize};

/// A single queued media entry.
///
/// Items are owned values and are copied whenever they are inserted, moved,
/// or recorded in a delta, so a later in-place mutation of the queue can
/// never retroactively change history already in the log.
///
/// The front of the queue (index 0) is the active item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// URL or path of the media source.
    pub url: String,

    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// URL or path of a thumbnail image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MediaItem {
    /// Create a media item from its source url.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            thumbnail: None,
        }
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach a thumbnail.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// A usable item carries a non-empty url.
    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let item = MediaItem::new("https://example.com/a.webm")
            .with_title("A")
            .with_thumbnail("https://example.com/a.png");

        assert_eq!(item.url, "https://example.com/a.webm");
        assert_eq!(item.title.as_deref(), Some("A"));
        assert_eq!(item.thumbnail.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_has_url() {
        assert!(MediaItem::new("a").has_url());
        assert!(!MediaItem::new("").has_url());
    }

    #[test]
    fn test_optional_fields_omitted_on_wire() {
        let json = serde_json::to_string(&MediaItem::new("a")).unwrap();
        assert_eq!(json, r#"{"url":"a"}"#);
    }

    #[test]
    fn test_deserialize_bare_url() {
        let item: MediaItem = serde_json::from_str(r#"{"url":"a"}"#).unwrap();
        assert_eq!(item, MediaItem::new("a"));
    }
}
