//! Listing page parser
//!
//! Turns content cards on catalog and search pages into [`CatalogEntry`]
//! records.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{compile, compile_all, element_text, first_url_attr};
use crate::config::SiteConfig;
use crate::error::{ProviderError, Result};
use crate::types::{CatalogEntry, CatalogSection, MediaKind};
use crate::url::normalize;

/// Extracts catalog entries from card elements
///
/// Holds the compiled card selectors of one site, so a page full of cards
/// compiles them once.
pub struct CardExtractor<'c> {
    config: &'c SiteConfig,
    title_selectors: Vec<Selector>,
    anchor: Selector,
    image: Selector,
}

impl<'c> CardExtractor<'c> {
    /// Compile the card selectors of a site
    ///
    /// # Errors
    /// Returns `ParseMiss` if a configured title selector is invalid
    pub fn new(config: &'c SiteConfig) -> Result<Self> {
        Ok(Self {
            config,
            title_selectors: compile_all(&config.card.title_selectors)?,
            anchor: compile("a[href]")?,
            image: compile("img")?,
        })
    }

    /// Parses a single card element
    ///
    /// # Returns
    /// `Some(CatalogEntry)` if the card has both a title and a link target,
    /// `None` otherwise
    pub fn extract_card(&self, element: ElementRef<'_>) -> Option<CatalogEntry> {
        let base = &self.config.base_url;

        let title = self
            .title_selectors
            .iter()
            .find_map(|selector| element.select(selector).next())
            .map(|el| element_text(&el))
            .unwrap_or_default();

        let own_href = match element.value().name() {
            "a" => element.value().attr("href"),
            _ => None,
        };
        let href = own_href
            .or_else(|| {
                element
                    .select(&self.anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
            })
            .unwrap_or_default();
        let url = normalize(href, base);

        if title.is_empty() || url.is_empty() {
            return None;
        }

        let poster_url = element
            .select(&self.image)
            .next()
            .and_then(|img| first_url_attr(&img, &self.config.card.poster_attrs))
            .map(|src| normalize(src, base))
            .unwrap_or_default();

        let media_kind = if self.is_series(element, &url) {
            MediaKind::Series
        } else {
            MediaKind::Movie
        };

        Some(CatalogEntry {
            title,
            url,
            poster_url,
            media_kind,
        })
    }

    fn is_series(&self, element: ElementRef<'_>, url: &str) -> bool {
        self.config
            .series_path_markers
            .iter()
            .any(|marker| url.contains(marker.as_str()))
            || element
                .value()
                .classes()
                .any(|class| self.config.card.series_classes.iter().any(|c| c == class))
    }

    /// Extracts every card matched by `selector` below `scope`
    ///
    /// Keeps document order and drops repeated links (first card wins).
    fn extract_all(&self, scope: ElementRef<'_>, selector: &Selector) -> Vec<CatalogEntry> {
        let mut seen = HashSet::new();
        scope
            .select(selector)
            .filter_map(|element| self.extract_card(element))
            .filter(|entry| seen.insert(entry.url.clone()))
            .collect()
    }
}

/// Parses a listing page and returns the cards matched by `card_selector`
///
/// # Arguments
/// * `html` - Raw HTML of a catalog or search page
/// * `card_selector` - Selector matching one element per card
/// * `config` - Site configuration
///
/// # Returns
/// Vector of entries, empty if no card matched
///
/// # Errors
/// Returns `ParseMiss` if a selector is invalid
pub fn parse_cards(html: &str, card_selector: &str, config: &SiteConfig) -> Result<Vec<CatalogEntry>> {
    let document = Html::parse_document(html);
    let extractor = CardExtractor::new(config)?;
    let selector = compile(card_selector)?;

    let entries = extractor.extract_all(document.root_element(), &selector);
    debug!(selector = card_selector, count = entries.len(), "parsed cards");
    Ok(entries)
}

/// Parses the catalog page into its configured sections
///
/// Sections are returned in configuration order; sections without any
/// card are left out.
///
/// # Errors
/// - `ParseMiss` if a selector is invalid
/// - `ParseMiss` if no section matched any card
pub fn parse_catalog(html: &str, config: &SiteConfig) -> Result<Vec<CatalogSection>> {
    let document = Html::parse_document(html);
    let extractor = CardExtractor::new(config)?;

    let mut sections = Vec::new();
    for section in &config.sections {
        let selector = compile(&section.selector)?;
        let entries = extractor.extract_all(document.root_element(), &selector);
        debug!(section = %section.label, count = entries.len(), "parsed catalog section");

        if !entries.is_empty() {
            sections.push(CatalogSection {
                label: section.label.clone(),
                entries,
            });
        }
    }

    if sections.is_empty() && !config.sections.is_empty() {
        return Err(ProviderError::ParseMiss(
            "No catalog section matched any card".to_string(),
        ));
    }

    Ok(sections)
}
