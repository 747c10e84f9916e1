//! Site scraper
//!
//! Combines the HTTP client and parsers into the four provider operations.
//! Every `try_*` method reports failures as [`ProviderError`]; the
//! [`Provider`](crate::Provider) impl turns them into empty results.

use tracing::debug;

use crate::client::{ClientConfig, SiteClient};
use crate::config::SiteConfig;
use crate::error::{ProviderError, Result};
use crate::parser::{
    StreamScanner, direct_stream, extract_iframe_streams, extract_subtitles, parse_cards,
    parse_catalog, parse_detail,
};
use crate::types::{CatalogEntry, CatalogSection, DetailRecord, ResolvedStreams};
use crate::url::{build_search_url, normalize};

/// Scraper for one configured site
///
/// Holds only immutable state: the site configuration, the compiled stream
/// patterns and a connection-pooling HTTP client. Safe to share between
/// concurrent operations.
pub struct SiteScraper {
    config: SiteConfig,
    client: SiteClient,
    scanner: StreamScanner,
}

impl SiteScraper {
    /// Create a new scraper with default client configuration
    ///
    /// # Errors
    /// - `InvalidPattern` if a stream pattern does not compile
    /// - `HttpError` if HTTP client initialization fails
    pub fn new(config: SiteConfig) -> Result<Self> {
        Self::with_client_config(config, ClientConfig::default())
    }

    /// Create a new scraper with custom client configuration
    ///
    /// # Arguments
    /// * `config` - Site configuration
    /// * `client_config` - Timeout and User-Agent for outbound requests
    pub fn with_client_config(config: SiteConfig, client_config: ClientConfig) -> Result<Self> {
        let client = SiteClient::with_config(client_config, &config.language)?;
        let scanner = StreamScanner::new(&config)?;
        Ok(Self {
            config,
            client,
            scanner,
        })
    }

    /// Site configuration this scraper was built with
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Fetch the catalog page and parse its sections
    ///
    /// # Errors
    /// - `HttpError`, `Status`, `NotFound`, `RateLimited` if the fetch fails
    /// - `ParseMiss` if no section matched any card
    pub async fn try_fetch_catalog(&self) -> Result<Vec<CatalogSection>> {
        let url = normalize(&self.config.catalog_path, &self.config.base_url);
        let html = self.client.fetch(&url).await?;
        parse_catalog(&html, &self.config)
    }

    /// Search the site
    ///
    /// # Returns
    /// Matching entries, empty if the site has no results
    ///
    /// # Errors
    /// - `InvalidQuery` if query is empty or whitespace only
    /// - `HttpError`, `Status`, `NotFound`, `RateLimited` if the fetch fails
    /// - `ParseMiss` if the search selector is invalid
    pub async fn try_search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::InvalidQuery(
                "Search query cannot be empty".to_string(),
            ));
        }

        let url = build_search_url(&self.config.base_url, &self.config.search_path, trimmed);
        let html = self.client.fetch(&url).await?;
        parse_cards(&html, &self.config.search_selector, &self.config)
    }

    /// Load a detail page
    ///
    /// # Arguments
    /// * `url` - Detail page URL, relative URLs are resolved against the site
    ///
    /// # Errors
    /// - `InvalidQuery` if url is empty
    /// - `HttpError`, `Status`, `NotFound`, `RateLimited` if the fetch fails
    /// - `ParseMiss` if a detail selector is invalid
    pub async fn try_load_detail(&self, url: &str) -> Result<DetailRecord> {
        let page_url = normalize(url, &self.config.base_url);
        if page_url.is_empty() {
            return Err(ProviderError::InvalidQuery(
                "Detail URL cannot be empty".to_string(),
            ));
        }

        let html = self.client.fetch(&page_url).await?;
        parse_detail(&html, &page_url, &self.config)
    }

    /// Resolve a locator into playable streams and subtitles
    ///
    /// A locator that already is a media URL is returned as-is without any
    /// request. Otherwise the locator is fetched and scanned: stream patterns
    /// first, then player iframes.
    ///
    /// # Errors
    /// - `InvalidQuery` if locator is empty
    /// - `HttpError`, `Status`, `NotFound`, `RateLimited` if the fetch fails
    /// - `PatternMiss` if the page holds no stream at all
    pub async fn try_resolve_streams(&self, locator: &str) -> Result<ResolvedStreams> {
        if let Some(link) = direct_stream(locator.trim(), &self.config) {
            return Ok(ResolvedStreams {
                streams: vec![link],
                subtitles: Vec::new(),
            });
        }

        let page_url = normalize(locator, &self.config.base_url);
        if page_url.is_empty() {
            return Err(ProviderError::InvalidQuery(
                "Locator cannot be empty".to_string(),
            ));
        }

        let text = self.client.fetch(&page_url).await?;

        let mut streams = self.scanner.scan(&text);
        for link in extract_iframe_streams(&text, &self.config)? {
            if !streams.iter().any(|existing| existing.url == link.url) {
                streams.push(link);
            }
        }

        // Subtitles are only reported alongside at least one stream
        if streams.is_empty() {
            return Err(ProviderError::PatternMiss(page_url));
        }

        let subtitles = extract_subtitles(&text, &self.config)?;
        debug!(
            url = %page_url,
            streams = streams.len(),
            subtitles = subtitles.len(),
            "resolved streams"
        );

        Ok(ResolvedStreams { streams, subtitles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> SiteScraper {
        SiteScraper::new(SiteConfig::vidbox()).unwrap()
    }

    #[test]
    fn test_scraper_creation() {
        let scraper = SiteScraper::new(SiteConfig::vidbox());
        assert!(scraper.is_ok());
    }

    #[test]
    fn test_scraper_with_custom_config() {
        let client_config = ClientConfig {
            timeout_secs: 60,
            ..ClientConfig::default()
        };
        let scraper = SiteScraper::with_client_config(SiteConfig::vidbox(), client_config);
        assert!(scraper.is_ok());
    }

    #[test]
    fn test_scraper_rejects_invalid_pattern() {
        let mut config = SiteConfig::vidbox();
        config.stream_patterns.push("(unclosed".to_string());
        match SiteScraper::new(config) {
            Err(ProviderError::InvalidPattern(msg)) => assert!(msg.contains("(unclosed")),
            _ => panic!("Expected InvalidPattern error"),
        }
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let result = scraper().try_search("").await;
        match result {
            Err(ProviderError::InvalidQuery(msg)) => {
                assert!(msg.contains("empty"));
            }
            _ => panic!("Expected InvalidQuery error"),
        }
    }

    #[tokio::test]
    async fn test_search_whitespace_query() {
        let result = scraper().try_search("   ").await;
        assert!(matches!(result, Err(ProviderError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_load_detail_empty_url() {
        let result = scraper().try_load_detail("").await;
        assert!(matches!(result, Err(ProviderError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_resolve_direct_media_without_fetch() {
        let resolved = scraper()
            .try_resolve_streams("https://cdn.example/movie.mp4")
            .await
            .unwrap();
        assert_eq!(resolved.streams.len(), 1);
        assert!(!resolved.streams[0].is_segmented);
        assert!(resolved.subtitles.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_empty_locator() {
        let result = scraper().try_resolve_streams(" ").await;
        assert!(matches!(result, Err(ProviderError::InvalidQuery(_))));
    }
}
