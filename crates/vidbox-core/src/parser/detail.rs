//! Detail page parser
//!
//! Decides whether a detail page describes a movie or a series and collects
//! its playable entries.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{
    compile, compile_all, element_text, first_attr, first_matching, first_url_attr, outermost,
};
use crate::config::SiteConfig;
use crate::error::Result;
use crate::types::{DetailRecord, EpisodeRef, MediaKind};
use crate::url::normalize;

const UNKNOWN_TITLE: &str = "Unknown Title";
const PLAY_LABEL: &str = "Play";

/// Result of classifying a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub media_kind: MediaKind,
    /// Episodes for a series, "Play" entries for a movie; never empty
    pub episodes: Vec<EpisodeRef>,
}

/// Classifies a parsed detail page
///
/// A page is a series iff at least one element matches the episode selector.
/// Episodes keep document order and are numbered from 1, unless the element
/// carries the configured episode number attribute.
///
/// A movie without embedded players gets a single "Play" entry pointing at
/// `page_url`, so every movie has something to resolve.
///
/// # Errors
/// Returns `ParseMiss` if a configured selector is invalid
pub fn classify(document: &Html, page_url: &str, config: &SiteConfig) -> Result<Classification> {
    let root = document.root_element();
    let episode_selector = compile(&config.detail.episode_selector)?;
    let matches: Vec<ElementRef> = root.select(&episode_selector).collect();

    if !matches.is_empty() {
        let episodes = collect_episodes(&outermost(&matches), page_url, config)?;
        return Ok(Classification {
            media_kind: MediaKind::Series,
            episodes,
        });
    }

    let mut episodes = collect_players(root, config)?;
    if episodes.is_empty() {
        episodes.push(EpisodeRef {
            display_name: PLAY_LABEL.to_string(),
            source_locator: page_url.to_string(),
            sequence_number: 1,
        });
    }

    Ok(Classification {
        media_kind: MediaKind::Movie,
        episodes,
    })
}

fn collect_episodes(
    elements: &[ElementRef],
    page_url: &str,
    config: &SiteConfig,
) -> Result<Vec<EpisodeRef>> {
    let base = &config.base_url;
    let anchor = compile("a[href]")?;
    let title_selector = compile(&config.detail.episode_title_selector)?;
    let locator_attrs = ["href".to_string(), "data-url".to_string()];

    let episodes = elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let position = index as u32 + 1;

            let sequence_number = element
                .value()
                .attr(&config.detail.episode_number_attr)
                .and_then(|value| value.trim().parse::<u32>().ok())
                .filter(|number| *number > 0)
                .unwrap_or(position);

            let locator = first_attr(element, &locator_attrs[..1])
                .or_else(|| {
                    element
                        .select(&anchor)
                        .next()
                        .and_then(|a| first_attr(&a, &locator_attrs[..1]))
                })
                .or_else(|| first_attr(element, &locator_attrs[1..]))
                .map(|raw| normalize(raw, base))
                .unwrap_or_else(|| page_url.to_string());

            let name = element
                .select(&title_selector)
                .next()
                .map(|el| element_text(&el))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| element_text(element));
            let display_name = if name.is_empty() {
                format!("Episode {}", sequence_number)
            } else {
                name
            };

            EpisodeRef {
                display_name,
                source_locator: locator,
                sequence_number,
            }
        })
        .collect();

    Ok(episodes)
}

fn collect_players(root: ElementRef, config: &SiteConfig) -> Result<Vec<EpisodeRef>> {
    let base = &config.base_url;
    let video_selector = compile(&config.detail.video_selector)?;
    let source_selector = compile("source[src]")?;
    let player_attrs = ["src".to_string(), "data-video".to_string()];

    let matches: Vec<ElementRef> = root.select(&video_selector).collect();
    let locators: Vec<String> = outermost(&matches)
        .iter()
        .filter_map(|element| {
            first_attr(element, &player_attrs).or_else(|| {
                element
                    .select(&source_selector)
                    .next()
                    .and_then(|source| source.value().attr("src"))
            })
        })
        .map(|raw| normalize(raw, base))
        .filter(|url| !url.is_empty())
        .collect();

    Ok(locators
        .into_iter()
        .enumerate()
        .map(|(index, source_locator)| EpisodeRef {
            display_name: PLAY_LABEL.to_string(),
            source_locator,
            sequence_number: index as u32 + 1,
        })
        .collect())
}

/// Parses a detail page into a [`DetailRecord`]
///
/// # Arguments
/// * `html` - Raw HTML of the detail page
/// * `page_url` - Absolute URL the page was fetched from
/// * `config` - Site configuration
///
/// # Errors
/// Returns `ParseMiss` if a configured selector is invalid
pub fn parse_detail(html: &str, page_url: &str, config: &SiteConfig) -> Result<DetailRecord> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let detail = &config.detail;

    let title = first_matching(root, &compile_all(&detail.title_selectors)?)
        .first()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let poster_url = first_matching(root, &compile_all(&detail.poster_selectors)?)
        .first()
        .and_then(|img| first_url_attr(img, &config.card.poster_attrs))
        .map(|src| normalize(src, &config.base_url))
        .unwrap_or_default();

    let plot = joined_text(root, &compile_all(&detail.plot_selectors)?);
    let year = extract_year(&joined_text(root, &compile_all(&detail.year_selectors)?));

    let Classification {
        media_kind,
        episodes,
    } = classify(&document, page_url, config)?;
    debug!(url = page_url, ?media_kind, episodes = episodes.len(), "parsed detail page");

    Ok(DetailRecord {
        title,
        url: page_url.to_string(),
        poster_url,
        plot,
        year,
        media_kind,
        episodes,
    })
}

/// Text of every match of the first matching candidate, space separated
fn joined_text(root: ElementRef, candidates: &[Selector]) -> String {
    first_matching(root, candidates)
        .iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First four-digit run in the text
fn extract_year(text: &str) -> Option<i32> {
    let re = Regex::new(r"\d{4}").ok()?;
    re.find(text).and_then(|m| m.as_str().parse::<i32>().ok())
}
