//! VidBox Provider Core Library
//!
//! Scrapes movie/TV streaming sites for a media-aggregation host: catalog
//! listing, search, detail pages and playable stream URLs.
//!
//! # Overview
//!
//! One parameterized scraper covers a family of near-identical sites:
//! - [`SiteConfig`] describes a site (base URL, selector priority lists,
//!   stream patterns)
//! - [`SiteScraper`] runs the operations, one HTTP GET each, and reports
//!   failures as [`ProviderError`]
//! - [`Provider`] is the host-facing capability; failures are logged and
//!   degrade to empty results
//!
//! # Example
//!
//! ```no_run
//! use vidbox_core::{Provider, SiteConfig, SiteScraper, StreamLink, SubtitleRef};
//!
//! #[tokio::main]
//! async fn main() -> vidbox_core::Result<()> {
//!     let provider = SiteScraper::new(SiteConfig::vidbox())?;
//!
//!     for entry in provider.search("dune").await {
//!         println!("{}: {}", entry.title, entry.url);
//!     }
//!
//!     if let Some(detail) = provider.load_detail("/movie/dune").await {
//!         let mut links = Vec::new();
//!         provider
//!             .resolve_streams(
//!                 &detail.episodes[0].source_locator,
//!                 &mut |link: StreamLink| links.push(link),
//!                 &mut |_: SubtitleRef| {},
//!             )
//!             .await;
//!         for link in links {
//!             println!("{} (hls: {})", link.url, link.is_segmented);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
pub mod parser;
mod provider;
mod scraper;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, SiteClient};

// Re-export configuration
pub use config::{CardSelectors, DetailSelectors, SectionConfig, SiteConfig};

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export parser entry points
pub use parser::{StreamScanner, classify, parse_cards, parse_catalog, parse_detail};

// Re-export host-facing API
pub use provider::{Provider, ProviderRegistry};
pub use crate::scraper::SiteScraper;

// Re-export data types
pub use types::{
    CatalogEntry, CatalogSection, DetailRecord, EpisodeRef, MediaKind, ResolvedStreams,
    StreamLink, SubtitleRef,
};

// Re-export URL helper functions for convenience
pub use url::normalize;
