//! HTML parsers for site pages
//!
//! Contains modules for parsing different page types, plus the selector
//! helpers they share.

pub mod card;
pub mod detail;
pub mod streams;

pub use card::{CardExtractor, parse_cards, parse_catalog};
pub use detail::{Classification, classify, parse_detail};
pub use streams::{StreamScanner, direct_stream, extract_iframe_streams, extract_subtitles};

use scraper::{ElementRef, Selector};

use crate::error::{ProviderError, Result};

/// Compiles a CSS selector, reporting invalid ones as a selector miss
pub(crate) fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ProviderError::ParseMiss(format!("Invalid selector {:?}: {:?}", css, e)))
}

/// Compiles a priority list of selectors, keeping their order
pub(crate) fn compile_all(candidates: &[String]) -> Result<Vec<Selector>> {
    candidates.iter().map(|css| compile(css)).collect()
}

/// Returns every match of the first candidate that matches anything
///
/// Candidates later in the list are only consulted when all earlier ones
/// match nothing below `scope`.
pub(crate) fn first_matching<'a>(scope: ElementRef<'a>, candidates: &[Selector]) -> Vec<ElementRef<'a>> {
    for selector in candidates {
        let matches: Vec<ElementRef<'a>> = scope.select(selector).collect();
        if !matches.is_empty() {
            return matches;
        }
    }
    Vec::new()
}

/// Drops matches nested inside another match of the same list
///
/// Selector groups such as `.episode-list a, .episode-item` can match both
/// an item and the anchor inside it; only the outer element is kept.
pub(crate) fn outermost<'a>(matches: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
    matches
        .iter()
        .filter(|element| {
            !element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| matches.contains(&ancestor))
        })
        .copied()
        .collect()
}

/// Text content of an element with whitespace collapsed
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty value among the given attributes
pub(crate) fn first_attr<'a>(element: &ElementRef<'a>, attrs: &[String]) -> Option<&'a str> {
    attrs
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// First attribute value usable as an image URL
///
/// Inline `data:` placeholders left by lazy loaders are skipped, so the
/// real source in `data-src` wins over them.
pub(crate) fn first_url_attr<'a>(element: &ElementRef<'a>, attrs: &[String]) -> Option<&'a str> {
    attrs
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty() && !value.starts_with("data:"))
}

/// Decodes common HTML entities in URLs taken from raw page text
pub(crate) fn decode_html_entities(url: &str) -> String {
    url.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("\\/", "/")
}
