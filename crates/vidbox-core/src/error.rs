//! Error types for the provider
//!
//! Every fallible step of a scrape reports one of these variants. The
//! [`Provider`](crate::Provider) boundary logs them and degrades to an
//! empty result, so hosts only see them through `SiteScraper::try_*`.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all scraping operations
///
/// Implements Display for human-readable messages and Serialize
/// so hosts can forward it as a plain string.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request could not complete (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// Page does not exist on the server (HTTP 404)
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Rate limited by server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Expected selector matched nothing, or a selector is invalid
    #[error("Selector miss: {0}")]
    ParseMiss(String),

    /// No stream pattern matched the fetched text
    #[error("No stream pattern matched: {0}")]
    PatternMiss(String),

    /// A configured stream pattern is not a valid regex
    #[error("Invalid stream pattern: {0}")]
    InvalidPattern(String),

    /// Site configuration could not be read
    #[error("Invalid site configuration: {0}")]
    InvalidConfig(String),

    /// Search query was empty
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl ProviderError {
    /// Short, stable name of the failure class, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::HttpError(_)
            | ProviderError::Status { .. }
            | ProviderError::NotFound(_)
            | ProviderError::RateLimited => "network",
            ProviderError::ParseMiss(_) => "parse_miss",
            ProviderError::PatternMiss(_) => "pattern_miss",
            ProviderError::InvalidPattern(_)
            | ProviderError::InvalidConfig(_)
            | ProviderError::InvalidQuery(_) => "invalid_input",
        }
    }
}

impl Serialize for ProviderError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_status() {
        let error = ProviderError::Status {
            status: 503,
            url: "https://vidbox.cc/".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unexpected HTTP status 503 for https://vidbox.cc/"
        );
    }

    #[test]
    fn test_error_display_parse_miss() {
        let error = ProviderError::ParseMiss(".episode-item".to_string());
        assert_eq!(error.to_string(), "Selector miss: .episode-item");
    }

    #[test]
    fn test_error_display_pattern_miss() {
        let error = ProviderError::PatternMiss("https://vidbox.cc/watch/1".to_string());
        assert_eq!(
            error.to_string(),
            "No stream pattern matched: https://vidbox.cc/watch/1"
        );
    }

    #[test]
    fn test_error_display_rate_limited() {
        let error = ProviderError::RateLimited;
        assert_eq!(error.to_string(), "Rate limited - too many requests");
    }

    #[test]
    fn test_error_display_invalid_query() {
        let error = ProviderError::InvalidQuery("".to_string());
        assert_eq!(error.to_string(), "Invalid query: ");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ProviderError::RateLimited.kind(), "network");
        assert_eq!(ProviderError::NotFound("x".into()).kind(), "network");
        assert_eq!(ProviderError::ParseMiss("x".into()).kind(), "parse_miss");
        assert_eq!(ProviderError::PatternMiss("x".into()).kind(), "pattern_miss");
        assert_eq!(ProviderError::InvalidQuery("x".into()).kind(), "invalid_input");
    }

    #[test]
    fn test_error_serialize() {
        let error = ProviderError::RateLimited;
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Rate limited - too many requests\"");
    }

    #[test]
    fn test_error_serialize_with_message() {
        let error = ProviderError::NotFound("https://vidbox.cc/movie/1".to_string());
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Page not found: https://vidbox.cc/movie/1\"");
    }
}
