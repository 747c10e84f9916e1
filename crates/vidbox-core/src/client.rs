//! HTTP client for site pages
//!
//! Thin wrapper over `reqwest` that issues exactly one GET per call and maps
//! HTTP failures onto [`ProviderError`]. No retries: a failed fetch is
//! reported to the caller as-is.

use std::time::Duration;

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::error::{ProviderError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// HTTP client shared by all operations of one scraper
///
/// Holds no per-call state; `reqwest::Client` pools connections internally.
pub struct SiteClient {
    client: reqwest::Client,
}

impl SiteClient {
    /// Create a new client with default configuration
    pub fn new(language: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), language)
    }

    /// Create a new client with custom configuration
    ///
    /// # Arguments
    /// * `config` - Timeout and User-Agent
    /// * `language` - Preferred content language, sent as Accept-Language
    pub fn with_config(config: ClientConfig, language: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("{},en;q=0.8", language)) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(ProviderError::HttpError)?;

        Ok(Self { client })
    }

    /// Fetch a page body as text
    ///
    /// # Arguments
    /// * `url` - Absolute URL to fetch
    ///
    /// # Errors
    /// - `HttpError` - Network errors, timeouts, unreadable body
    /// - `NotFound` - Server returned 404
    /// - `RateLimited` - Server returned 429
    /// - `Status` - Any other non-success status
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProviderError::HttpError)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(ProviderError::HttpError)?;
        debug!(url = %url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
