//! Track metadata
//!
//! Stored as a compact JSON object with the keys `artist`, `title` and
//! `album`, in that order. Missing keys decode as empty strings.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, DmdResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
    pub album: String,
}

impl TrackMetadata {
    /// empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// metadata from the three basic fields
    pub fn with_basic(
        artist: impl Into<String>,
        title: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        TrackMetadata {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artist.is_empty() && self.title.is_empty() && self.album.is_empty()
    }

    /// serialize to the on-disk JSON blob
    pub fn to_json(&self) -> DmdResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ConfigError::Metadata(e).into())
    }

    /// parse an on-disk JSON blob
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_order() {
        let meta = TrackMetadata::with_basic("A", "B", "");
        let json = meta.to_json().unwrap();
        assert_eq!(json, br#"{"artist":"A","title":"B","album":""}"#);
    }

    #[test]
    fn test_missing_keys_default() {
        let meta = TrackMetadata::from_json(br#"{"title":"Only"}"#).unwrap();
        assert_eq!(meta.title, "Only");
        assert!(meta.artist.is_empty());
        assert!(meta.album.is_empty());
    }

    #[test]
    fn test_not_an_object() {
        assert!(TrackMetadata::from_json(b"[1,2]").is_err());
        assert!(TrackMetadata::from_json(b"{\"artist\":").is_err());
    }
}
