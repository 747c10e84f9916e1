//! Provider capability exposed to a host application
//!
//! The host drives four operations and never sees an error: each operation
//! logs its failure and degrades to an empty result. Hosts that need the
//! failure itself call the `try_*` methods of [`SiteScraper`] directly.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::scraper::SiteScraper;
use crate::types::{CatalogEntry, CatalogSection, DetailRecord, MediaKind, StreamLink, SubtitleRef};

/// A streaming-site provider as seen by the host
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name shown by the host, unique within a registry
    fn name(&self) -> &str;

    /// Site the provider scrapes
    fn base_url(&self) -> &str;

    /// ISO 639-1 content language
    fn language(&self) -> &str;

    /// Media kinds this provider can list
    fn supported_kinds(&self) -> &[MediaKind] {
        &[MediaKind::Movie, MediaKind::Series]
    }

    /// Catalog sections in display order, empty on failure
    async fn fetch_catalog(&self) -> Vec<CatalogSection>;

    /// Search results, empty on failure
    async fn search(&self, query: &str) -> Vec<CatalogEntry>;

    /// Search-as-you-type results
    async fn quick_search(&self, query: &str) -> Vec<CatalogEntry> {
        self.search(query).await
    }

    /// Detail page, `None` on failure
    async fn load_detail(&self, url: &str) -> Option<DetailRecord>;

    /// Emits every stream and subtitle found for a locator
    ///
    /// # Returns
    /// `true` iff at least one stream was emitted
    async fn resolve_streams(
        &self,
        locator: &str,
        emit: &mut (dyn FnMut(StreamLink) + Send),
        emit_subtitle: &mut (dyn FnMut(SubtitleRef) + Send),
    ) -> bool;
}

#[async_trait]
impl Provider for SiteScraper {
    fn name(&self) -> &str {
        &self.config().name
    }

    fn base_url(&self) -> &str {
        &self.config().base_url
    }

    fn language(&self) -> &str {
        &self.config().language
    }

    async fn fetch_catalog(&self) -> Vec<CatalogSection> {
        match self.try_fetch_catalog().await {
            Ok(sections) => sections,
            Err(e) => {
                warn!(provider = self.name(), kind = e.kind(), error = %e, "catalog fetch failed");
                Vec::new()
            }
        }
    }

    async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        match self.try_search(query).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(provider = self.name(), kind = e.kind(), error = %e, query, "search failed");
                Vec::new()
            }
        }
    }

    async fn load_detail(&self, url: &str) -> Option<DetailRecord> {
        match self.try_load_detail(url).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(provider = self.name(), kind = e.kind(), error = %e, url, "detail load failed");
                None
            }
        }
    }

    async fn resolve_streams(
        &self,
        locator: &str,
        emit: &mut (dyn FnMut(StreamLink) + Send),
        emit_subtitle: &mut (dyn FnMut(SubtitleRef) + Send),
    ) -> bool {
        match self.try_resolve_streams(locator).await {
            Ok(resolved) => {
                let found = !resolved.streams.is_empty();
                for subtitle in resolved.subtitles {
                    emit_subtitle(subtitle);
                }
                for link in resolved.streams {
                    emit(link);
                }
                found
            }
            Err(e) => {
                warn!(provider = self.name(), kind = e.kind(), error = %e, locator, "stream resolution failed");
                false
            }
        }
    }
}

/// Providers registered by a plugin
///
/// Stands in for the host's registration callback: a plugin registers its
/// providers once, the host looks them up by name.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any provider with the same name
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        if let Some(slot) = self
            .providers
            .iter_mut()
            .find(|existing| existing.name() == provider.name())
        {
            warn!(provider = provider.name(), "replacing registered provider");
            *slot = provider;
        } else {
            self.providers.push(provider);
        }
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|provider| provider.name() == name)
            .cloned()
    }

    /// Registered providers in registration order
    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
