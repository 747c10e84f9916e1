//! Core data types for the provider
//!
//! Flat records handed to the host. Every URL field holds an absolute URL
//! (or is empty where the field is optional on the page).

use serde::{Deserialize, Serialize};

/// Kind of title a catalog card or detail page describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
}

/// One item of a listing page (catalog section or search results)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display title
    pub title: String,

    /// Absolute URL of the detail page
    pub url: String,

    /// Absolute poster URL, empty when the card has no image
    pub poster_url: String,

    /// Movie unless the link looks like a series path
    pub media_kind: MediaKind,
}

/// A labelled group of entries on the catalog page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
    pub label: String,
    pub entries: Vec<CatalogEntry>,
}

/// Something playable on a detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub display_name: String,

    /// Opaque locator passed back into stream resolution (usually a URL)
    pub source_locator: String,

    /// 1-based position, or the site's own episode number when present
    pub sequence_number: u32,
}

/// Everything loaded from a detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub title: String,

    /// Absolute URL the record was loaded from
    pub url: String,

    pub poster_url: String,
    pub plot: String,

    /// Release year, when the page shows one
    pub year: Option<i32>,

    pub media_kind: MediaKind,

    /// Never empty for movies: at least one "Play" entry is synthesized
    pub episodes: Vec<EpisodeRef>,
}

/// A playable stream found during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    pub display_name: String,
    pub source_label: String,

    /// Absolute stream URL
    pub url: String,

    /// True for HLS playlists (`.m3u8`), false for progressive files
    pub is_segmented: bool,

    /// Vertical resolution when the URL names one (e.g. "720p")
    pub quality: Option<u32>,

    /// Referer the stream host expects, if any
    pub referer: Option<String>,
}

/// A subtitle track found during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleRef {
    pub label: String,
    pub language: String,
    pub url: String,
}

/// Everything found while resolving one locator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStreams {
    pub streams: Vec<StreamLink>,
    pub subtitles: Vec<SubtitleRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&MediaKind::Series).unwrap(), "\"series\"");
    }

    #[test]
    fn test_media_kind_default_is_movie() {
        assert_eq!(MediaKind::default(), MediaKind::Movie);
    }

    #[test]
    fn test_detail_record_serialization() {
        let record = DetailRecord {
            title: "Dune".to_string(),
            url: "https://vidbox.cc/movie/dune".to_string(),
            poster_url: "https://vidbox.cc/img/dune.jpg".to_string(),
            plot: "Spice.".to_string(),
            year: Some(2021),
            media_kind: MediaKind::Movie,
            episodes: vec![EpisodeRef {
                display_name: "Play".to_string(),
                source_locator: "https://vidbox.cc/movie/dune".to_string(),
                sequence_number: 1,
            }],
        };

        let json = serde_json::to_string(&record).expect("Serialization should succeed");
        assert!(json.contains("\"media_kind\":\"movie\""));

        let deserialized: DetailRecord =
            serde_json::from_str(&json).expect("Deserialization should succeed");
        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_stream_link_with_none_fields() {
        let link = StreamLink {
            display_name: "VidBox".to_string(),
            source_label: "VidBox".to_string(),
            url: "https://cdn.example/a.mp4".to_string(),
            is_segmented: false,
            quality: None,
            referer: None,
        };

        let json = serde_json::to_string(&link).expect("Serialization should succeed");
        assert!(json.contains("\"quality\":null"));
    }
}
