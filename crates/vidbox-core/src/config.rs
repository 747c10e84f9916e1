//! Per-site configuration
//!
//! A [`SiteConfig`] is everything that differs between two streaming sites
//! of the same family: base URL, display name, selector priority lists and
//! stream patterns. It is immutable once handed to a scraper.

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// One labelled section of the catalog page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub label: String,
    /// Selector matching the cards of this section
    pub selector: String,
}

/// Selectors used inside a single card element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSelectors {
    /// Title candidates, first candidate with any match wins
    pub title_selectors: Vec<String>,
    /// Image attributes tried in order (primary first, lazy-load after)
    pub poster_attrs: Vec<String>,
    /// Card classes that mark a series
    pub series_classes: Vec<String>,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            title_selectors: strings(&[".title", "h3", "h4", "[class*='title']"]),
            poster_attrs: strings(&["src", "data-src", "data-lazy-src"]),
            series_classes: strings(&["tv-item"]),
        }
    }
}

/// Selectors used on a detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub title_selectors: Vec<String>,
    /// Image elements holding the poster
    pub poster_selectors: Vec<String>,
    pub plot_selectors: Vec<String>,
    pub year_selectors: Vec<String>,
    /// Any match makes the page a series
    pub episode_selector: String,
    /// Episode name inside an episode element
    pub episode_title_selector: String,
    /// Attribute carrying the site's own episode number
    pub episode_number_attr: String,
    /// Embedded players on a movie page
    pub video_selector: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            title_selectors: strings(&["h1", ".title", "[class*='title']"]),
            poster_selectors: strings(&[
                ".poster img",
                ".cover img",
                "[class*='poster'] img",
                "img.poster",
            ]),
            plot_selectors: strings(&[".description", ".synopsis", ".plot", "[class*='desc']"]),
            year_selectors: strings(&[".year", ".release-date", "[class*='year']"]),
            episode_selector: ".episode-list a, .episode-item, [class*='episode'] a".to_string(),
            episode_title_selector: ".ep-title".to_string(),
            episode_number_attr: "data-episode".to_string(),
            video_selector: "video, [class*='video'] source, [data-video]".to_string(),
        }
    }
}

/// Immutable description of one streaming site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Provider name shown by the host
    pub name: String,
    /// Source label attached to every stream link
    pub source_label: String,
    pub base_url: String,
    /// ISO 639-1 code, also sent as Accept-Language
    pub language: String,
    /// Page holding the catalog sections
    pub catalog_path: String,
    pub sections: Vec<SectionConfig>,
    /// Search path template, `{query}` is replaced by the encoded query
    pub search_path: String,
    pub search_selector: String,
    /// Link fragments that mark a series
    pub series_path_markers: Vec<String>,
    pub card: CardSelectors,
    pub detail: DetailSelectors,
    /// Regexes whose first capture group is a stream URL, applied in order
    pub stream_patterns: Vec<String>,
    /// Iframe sources containing any of these are treated as players
    pub iframe_keywords: Vec<String>,
}

impl SiteConfig {
    /// Configuration for vidbox.cc
    pub fn vidbox() -> Self {
        Self {
            name: "VidBox".to_string(),
            source_label: "VidBox".to_string(),
            base_url: "https://vidbox.cc".to_string(),
            language: "en".to_string(),
            catalog_path: "/".to_string(),
            sections: vec![
                SectionConfig {
                    label: "Featured Content".to_string(),
                    selector: ".featured-movies .movie-item, .slider-item, .featured-item"
                        .to_string(),
                },
                SectionConfig {
                    label: "Latest Releases".to_string(),
                    selector: ".latest-movies .item, .new-releases .item, .movie-list .item"
                        .to_string(),
                },
            ],
            search_path: "/search?q={query}".to_string(),
            search_selector: ".movie-item, .search-result, .item".to_string(),
            series_path_markers: strings(&["/tv/"]),
            card: CardSelectors::default(),
            detail: DetailSelectors::default(),
            stream_patterns: strings(&[
                r#"\bfile["']?\s*:\s*["']([^"']+\.(?i:mp4|m3u8)[^"']*)["']"#,
                r#"\bsrc["']?\s*:\s*["']([^"']+\.(?i:mp4|m3u8)[^"']*)["']"#,
                r#"<video\b[^>]*?\bsrc\s*=\s*["']([^"']+\.(?i:mp4|m3u8)[^"']*)["']"#,
                r#"<source\b[^>]*?\bsrc\s*=\s*["']([^"']+\.(?i:mp4|m3u8)[^"']*)["']"#,
                r#"\bvideoUrl\s*=\s*["']([^"']+)["']"#,
            ]),
            iframe_keywords: strings(&["vid"]),
        }
    }

    /// Reads a configuration from JSON, missing fields take vidbox defaults
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the JSON is malformed or has no base URL
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SiteConfig =
            serde_json::from_str(json).map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;

        if config.base_url.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }

        Ok(config)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::vidbox()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
