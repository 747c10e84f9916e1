//! Stream extraction for player pages
//!
//! Finds playable URLs in fetched page text: quoted `.mp4`/`.m3u8` URLs
//! after well-known player keys (`file:`, `src:`, `<video src=..>`,
//! `<source src=..>`), any `videoUrl =` assignment, embedded player iframes
//! and subtitle tracks from `<track>` elements or JWPlayer `tracks` blocks.

use std::collections::HashSet;

use regex::Regex;
use scraper::Html;
use tracing::debug;

use super::{compile, decode_html_entities, element_text};
use crate::config::SiteConfig;
use crate::error::{ProviderError, Result};
use crate::types::{StreamLink, SubtitleRef};
use crate::url::{has_media_extension, is_absolute, is_direct_media, is_segmented, normalize};

const SUBTITLE_EXTENSIONS: [&str; 2] = [".vtt", ".srt"];

/// Scans page text for stream URLs with the site's pattern list
///
/// Patterns are compiled once at construction. Each pattern's first capture
/// group is the candidate URL (the whole match when it has no group).
pub struct StreamScanner {
    patterns: Vec<Regex>,
    base_url: String,
    name: String,
    source_label: String,
}

impl StreamScanner {
    /// Compile the stream patterns of a site
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a configured pattern is not a valid regex
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let patterns = config
            .stream_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ProviderError::InvalidPattern(format!("{}: {}", pattern, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            base_url: config.base_url.clone(),
            name: config.name.clone(),
            source_label: config.source_label.clone(),
        })
    }

    /// Returns every accepted stream URL in order of first appearance
    ///
    /// A candidate is kept when it has a media extension or is already
    /// absolute; anything else is a false positive (`src: "player.js"`).
    /// Duplicates by final URL are dropped, first occurrence wins.
    pub fn scan(&self, text: &str) -> Vec<StreamLink> {
        let mut candidates: Vec<(usize, &str)> = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                if let Some(m) = caps.get(1).or_else(|| caps.get(0)) {
                    candidates.push((m.start(), m.as_str()));
                }
            }
        }
        candidates.sort_by_key(|(position, _)| *position);

        let mut seen = HashSet::new();
        let links: Vec<StreamLink> = candidates
            .into_iter()
            .map(|(_, raw)| decode_html_entities(raw.trim()))
            .filter(|raw| !raw.is_empty() && (has_media_extension(raw) || is_absolute(raw)))
            .map(|raw| normalize(&raw, &self.base_url))
            .filter(|url| seen.insert(url.clone()))
            .map(|url| self.link(url, None))
            .collect();

        debug!(count = links.len(), "scanned page text for streams");
        links
    }

    fn link(&self, url: String, referer: Option<String>) -> StreamLink {
        StreamLink {
            display_name: self.name.clone(),
            source_label: self.source_label.clone(),
            is_segmented: is_segmented(&url),
            quality: parse_quality(&url),
            url,
            referer,
        }
    }
}

/// Builds a stream link for a locator that already is a media URL
///
/// # Returns
/// `Some(StreamLink)` when the locator contains `.mp4` or `.m3u8`, `None`
/// when it has to be fetched and scanned
pub fn direct_stream(locator: &str, config: &SiteConfig) -> Option<StreamLink> {
    if !is_direct_media(locator) {
        return None;
    }

    let url = normalize(locator, &config.base_url);
    Some(StreamLink {
        display_name: config.name.clone(),
        source_label: config.source_label.clone(),
        is_segmented: is_segmented(&url),
        quality: parse_quality(&url),
        url,
        referer: None,
    })
}

/// Extracts embedded player iframes
///
/// Only iframes whose URL contains one of the configured keywords are kept;
/// an empty keyword list keeps every iframe.
///
/// # Errors
/// Returns `ParseMiss` if the iframe selector cannot be compiled
pub fn extract_iframe_streams(html: &str, config: &SiteConfig) -> Result<Vec<StreamLink>> {
    let document = Html::parse_document(html);
    let selector = compile("iframe")?;
    let base = &config.base_url;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for iframe in document.select(&selector) {
        let src = iframe
            .value()
            .attr("src")
            .filter(|src| !src.trim().is_empty())
            .or_else(|| iframe.value().attr("data-src"))
            .unwrap_or_default();
        let url = normalize(&decode_html_entities(src), base);

        if url.is_empty() || !matches_keyword(&url, &config.iframe_keywords) {
            continue;
        }
        if !seen.insert(url.clone()) {
            continue;
        }

        let title = iframe
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or("Stream");

        links.push(StreamLink {
            display_name: format!("{} - {}", config.name, title),
            source_label: config.source_label.clone(),
            is_segmented: is_segmented(&url),
            quality: parse_quality(&url),
            url,
            referer: Some(base.clone()),
        });
    }

    Ok(links)
}

fn matches_keyword(url: &str, keywords: &[String]) -> bool {
    keywords.is_empty() || keywords.iter().any(|keyword| url.contains(keyword.as_str()))
}

/// Extracts subtitle tracks from `<track>` elements and JWPlayer setups
///
/// A `<track>` counts when its kind is `captions`/`subtitles` or its source
/// is a `.vtt`/`.srt` file. Language comes from `srclang`, else the
/// lowercased label. JWPlayer entries follow in page order, duplicates of an
/// earlier track by URL are dropped.
///
/// # Errors
/// Returns `ParseMiss` if the track selector cannot be compiled
pub fn extract_subtitles(html: &str, config: &SiteConfig) -> Result<Vec<SubtitleRef>> {
    let document = Html::parse_document(html);
    let selector = compile("track[src]")?;

    let mut seen = HashSet::new();
    let mut tracks = Vec::new();

    for track in document.select(&selector) {
        let element = track.value();
        let src = element.attr("src").unwrap_or_default();
        let kind = element.attr("kind").unwrap_or_default().to_ascii_lowercase();
        let is_subtitle = kind == "captions"
            || kind == "subtitles"
            || SUBTITLE_EXTENSIONS
                .iter()
                .any(|ext| src.to_ascii_lowercase().contains(ext));
        if !is_subtitle {
            continue;
        }

        let url = normalize(&decode_html_entities(src), &config.base_url);
        if url.is_empty() || !seen.insert(url.clone()) {
            continue;
        }

        let srclang = element.attr("srclang").map(str::trim).unwrap_or_default();
        let label = element
            .attr("label")
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .or_else(|| Some(element_text(&track)).filter(|text| !text.is_empty()))
            .unwrap_or_else(|| {
                if srclang.is_empty() {
                    "Subtitle".to_string()
                } else {
                    srclang.to_uppercase()
                }
            });
        let language = if srclang.is_empty() {
            label.to_lowercase()
        } else {
            srclang.to_string()
        };

        tracks.push(SubtitleRef {
            label,
            language,
            url,
        });
    }

    for track in extract_jwplayer_tracks(html, &config.base_url) {
        if seen.insert(track.url.clone()) {
            tracks.push(track);
        }
    }

    Ok(tracks)
}

/// Extracts caption entries from JWPlayer `tracks: [{ file: .., label: .. }]`
///
/// Entries with a `kind` other than captions/subtitles (thumbnails,
/// chapters) are skipped.
fn extract_jwplayer_tracks(html: &str, base: &str) -> Vec<SubtitleRef> {
    let mut tracks = Vec::new();

    let Ok(entry) = Regex::new(
        r#"\{[^{}]*?\bfile["']?\s*:\s*["']([^"']+\.(?i:vtt|srt)[^"']*)["']([^{}]*)\}"#,
    ) else {
        return tracks;
    };
    let Ok(label_re) = Regex::new(r#"\blabel["']?\s*:\s*["']([^"']+)["']"#) else {
        return tracks;
    };
    let Ok(kind_re) = Regex::new(r#"\bkind["']?\s*:\s*["']([^"']+)["']"#) else {
        return tracks;
    };

    for caps in entry.captures_iter(html) {
        let (Some(file), Some(whole)) = (caps.get(1), caps.get(0)) else {
            continue;
        };
        let object = whole.as_str();

        let kind = kind_re
            .captures(object)
            .and_then(|k| k.get(1))
            .map(|k| k.as_str().to_ascii_lowercase());
        if matches!(kind.as_deref(), Some(kind) if kind != "captions" && kind != "subtitles") {
            continue;
        }

        let url = normalize(&decode_html_entities(file.as_str()), base);
        if url.is_empty() {
            continue;
        }

        let raw_label = label_re
            .captures(object)
            .and_then(|l| l.get(1))
            .map(|l| l.as_str().trim())
            .unwrap_or("Subtitle");

        tracks.push(SubtitleRef {
            label: clean_subtitle_label(raw_label),
            language: language_from_label(raw_label),
            url,
        });
    }

    tracks
}

/// Cleans a JWPlayer label: "ENG - 8175377 - eng" becomes "ENG"
fn clean_subtitle_label(raw: &str) -> String {
    raw.split(" - ").next().unwrap_or(raw).trim().to_string()
}

/// Language code from a JWPlayer label: "ENG - 8175377 - eng" gives "eng"
fn language_from_label(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(" - ").collect();
    match parts.as_slice() {
        [.., last] if parts.len() >= 3 => last.trim().to_string(),
        _ => parts.first().copied().unwrap_or(raw).trim().to_lowercase(),
    }
}

/// Tries to find a resolution token like "720p" in a URL
fn parse_quality(url: &str) -> Option<u32> {
    let re = Regex::new(r"(?i)(?:^|[^0-9a-z])(\d{3,4})p(?:[^0-9a-z]|$)").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> StreamScanner {
        StreamScanner::new(&SiteConfig::vidbox()).unwrap()
    }

    #[test]
    fn test_scan_relative_mp4() {
        let links = scanner().scan(r#"player.setup({ file: "a.mp4" });"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://vidbox.cc/a.mp4");
        assert!(!links[0].is_segmented);
    }

    #[test]
    fn test_scan_protocol_relative_m3u8() {
        let links = scanner().scan(r#"{ src: "//cdn/x.m3u8" }"#);
        assert_eq!(links.len(), 1);
        assert!(links[0].url.starts_with("https:"));
        assert_eq!(links[0].url, "https://cdn/x.m3u8");
        assert!(links[0].is_segmented);
    }

    #[test]
    fn test_scan_dedups_across_patterns() {
        let text = r#"
            <video><source src="https://cdn.example/movie.mp4" type="video/mp4"></video>
            <script>var videoUrl = "https://cdn.example/movie.mp4";</script>
        "#;
        let links = scanner().scan(text);
        assert_eq!(links.len(), 1);

        // Scanning again yields the same single link
        assert_eq!(scanner().scan(text), links);
    }

    #[test]
    fn test_scan_orders_by_position() {
        let text = r#"
            var videoUrl = "https://cdn.example/first.m3u8";
            jwplayer().setup({ file: "https://cdn.example/second.mp4" });
        "#;
        let links = scanner().scan(text);
        assert_eq!(links.len(), 2);
        assert!(links[0].url.ends_with("first.m3u8"));
        assert!(links[1].url.ends_with("second.mp4"));
    }

    #[test]
    fn test_scan_rejects_relative_non_media() {
        let links = scanner().scan(r#"{ src: "js/player.js", file: "thumb.jpg" }"#);
        assert!(links.is_empty());
    }

    #[test]
    fn test_scan_ignores_jwplayer_tracks_and_images() {
        let text = r#"
            jwplayer("player").setup({
                file: "https://cdn.example/movie.m3u8",
                tracks: [
                    { file: "https://cdn.example/subs/en.vtt", label: "English", kind: "captions" },
                    { file: "https://cdn.example/thumbs.vtt", kind: "thumbnails" }
                ]
            });
            slider.add({ src: "https://img.example/banner.jpg" });
            <audio><source src="https://cdn.example/theme.mp3" type="audio/mpeg"></audio>
        "#;
        let urls: Vec<String> = scanner().scan(text).into_iter().map(|l| l.url).collect();
        assert_eq!(urls, vec!["https://cdn.example/movie.m3u8"]);
    }

    #[test]
    fn test_scan_page_without_video() {
        let text = r#"{ src: "https://img.example/banner.jpg" } <source src="https://cdn.example/theme.mp3">"#;
        assert!(scanner().scan(text).is_empty());
    }

    #[test]
    fn test_scan_video_src_attribute() {
        let links = scanner().scan(r#"<video src="/media/movie.mp4" controls></video>"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://vidbox.cc/media/movie.mp4");
    }

    #[test]
    fn test_scan_uppercase_extension_is_segmented() {
        let links = scanner().scan(r#"{ file: "https://cdn.example/LIVE.M3U8" }"#);
        assert_eq!(links.len(), 1);
        assert!(links[0].is_segmented);
    }

    #[test]
    fn test_scan_accepts_absolute_without_extension() {
        let links = scanner().scan(r#"videoUrl = 'https://stream.example/play?id=42'"#);
        assert_eq!(links.len(), 1);
        assert!(!links[0].is_segmented);
    }

    #[test]
    fn test_scan_decodes_escaped_urls() {
        let links = scanner().scan(r#"{"file":"https:\/\/cdn.example\/hls\/720p\/index.m3u8?a=1&amp;b=2"}"#);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://cdn.example/hls/720p/index.m3u8?a=1&b=2");
        assert_eq!(links[0].quality, Some(720));
    }

    #[test]
    fn test_scan_no_match() {
        let links = scanner().scan("<html><body>Nothing to see</body></html>");
        assert!(links.is_empty());
    }

    #[test]
    fn test_scanner_invalid_pattern() {
        let mut config = SiteConfig::vidbox();
        config.stream_patterns = vec!["file:(".to_string()];
        let result = StreamScanner::new(&config);
        assert!(matches!(result, Err(ProviderError::InvalidPattern(_))));
    }

    #[test]
    fn test_direct_stream() {
        let config = SiteConfig::vidbox();
        let link = direct_stream("https://cdn.example/master.m3u8", &config).unwrap();
        assert!(link.is_segmented);
        assert_eq!(link.source_label, "VidBox");

        assert!(direct_stream("https://vidbox.cc/watch/1", &config).is_none());
    }

    #[test]
    fn test_extract_iframe_streams() {
        let config = SiteConfig::vidbox();
        let html = r#"
        <html><body>
            <iframe src="//vidsrc.example/embed/1" title="Server 1"></iframe>
            <iframe src="https://ads.example/banner"></iframe>
            <iframe data-src="/vidplay/2"></iframe>
            <iframe src="//vidsrc.example/embed/1"></iframe>
        </body></html>
        "#;

        let links = extract_iframe_streams(html, &config).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://vidsrc.example/embed/1");
        assert_eq!(links[0].display_name, "VidBox - Server 1");
        assert_eq!(links[0].referer.as_deref(), Some("https://vidbox.cc"));
        assert_eq!(links[1].url, "https://vidbox.cc/vidplay/2");
        assert_eq!(links[1].display_name, "VidBox - Stream");
    }

    #[test]
    fn test_extract_subtitles() {
        let config = SiteConfig::vidbox();
        let html = r#"
        <video>
            <track kind="captions" src="/subs/en.vtt" srclang="en" label="English">
            <track kind="subtitles" src="https://subs.example/cs.srt" label="Czech">
            <track kind="chapters" src="/chapters.txt">
        </video>
        "#;

        let tracks = extract_subtitles(html, &config).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].url, "https://vidbox.cc/subs/en.vtt");
        assert_eq!(tracks[0].language, "en");
        assert_eq!(tracks[0].label, "English");
        assert_eq!(tracks[1].language, "czech");
    }

    #[test]
    fn test_extract_subtitles_jwplayer_tracks() {
        let config = SiteConfig::vidbox();
        let html = r#"
        <script>
            jwplayer("player").setup({
                file: "https://cdn.example/movie.m3u8",
                tracks: [
                    { file: "https://cdn.example/subs/en.vtt?token=abc", label: "ENG - 8175377 - eng", kind: "captions" },
                    { file: "/subs/cs.srt", "label": "Czech" },
                    { file: "https://cdn.example/thumbs.vtt", kind: "thumbnails" }
                ]
            });
        </script>
        "#;

        let tracks = extract_subtitles(html, &config).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].url, "https://cdn.example/subs/en.vtt?token=abc");
        assert_eq!(tracks[0].label, "ENG");
        assert_eq!(tracks[0].language, "eng");
        assert_eq!(tracks[1].url, "https://vidbox.cc/subs/cs.srt");
        assert_eq!(tracks[1].label, "Czech");
        assert_eq!(tracks[1].language, "czech");
    }

    #[test]
    fn test_extract_subtitles_dedups_track_and_jwplayer() {
        let config = SiteConfig::vidbox();
        let html = r#"
        <video><track kind="captions" src="https://cdn.example/en.vtt" srclang="en" label="English"></video>
        <script>var tracks = [{ file: "https://cdn.example/en.vtt", label: "English", kind: "captions" }];</script>
        "#;

        let tracks = extract_subtitles(html, &config).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].language, "en");
    }

    #[test]
    fn test_language_from_label() {
        assert_eq!(clean_subtitle_label("ENG - 8175377 - eng"), "ENG");
        assert_eq!(language_from_label("ENG - 8175377 - eng"), "eng");
        assert_eq!(language_from_label("English"), "english");
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("https://cdn/movie_1080p.mp4"), Some(1080));
        assert_eq!(parse_quality("https://cdn/720p/index.m3u8"), Some(720));
        assert_eq!(parse_quality("https://cdn/movie.mp4"), None);
    }
}
