//! URL helper functions
//!
//! Normalizes the relative links scraped from a page into absolute URLs and
//! builds request URLs for a site.

const MEDIA_EXTENSIONS: [&str; 2] = [".mp4", ".m3u8"];

/// Resolves a possibly-relative URL against a site base URL
///
/// Total over its input: an empty `raw` yields an empty string, which
/// callers treat as "absent".
///
/// # Arguments
/// * `raw` - URL as found in the page (absolute, `//host/..`, `/path` or `path`)
/// * `base` - Site base URL, e.g. "https://vidbox.cc"
///
/// # Example
/// ```
/// use vidbox_core::url::normalize;
/// assert_eq!(normalize("/movie/1", "https://vidbox.cc"), "https://vidbox.cc/movie/1");
/// assert_eq!(normalize("//cdn.host/a.m3u8", "https://vidbox.cc"), "https://cdn.host/a.m3u8");
/// assert_eq!(normalize("movie/1", "https://vidbox.cc/"), "https://vidbox.cc/movie/1");
/// ```
pub fn normalize(raw: &str, base: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("http") {
        return raw.to_string();
    }
    if raw.starts_with("//") {
        return format!("https:{}", raw);
    }

    let base = base.trim_end_matches('/');
    if raw.starts_with('/') {
        format!("{}{}", base, raw)
    } else {
        format!("{}/{}", base, raw)
    }
}

/// Builds the search URL for a query
///
/// URL encodes the query and substitutes it for `{query}` in the site's
/// search path template.
///
/// # Example
/// ```
/// use vidbox_core::url::build_search_url;
/// let url = build_search_url("https://vidbox.cc", "/search?q={query}", "the matrix");
/// assert_eq!(url, "https://vidbox.cc/search?q=the%20matrix");
/// ```
pub fn build_search_url(base: &str, template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(query.trim());
    normalize(&template.replace("{query}", &encoded), base)
}

/// Checks whether the URL path ends with a known media extension
///
/// Query string and fragment are ignored, so signed CDN links
/// (`.../a.m3u8?token=..`) still count.
pub fn has_media_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Checks whether a locator already points at a media file or playlist
pub fn is_direct_media(locator: &str) -> bool {
    MEDIA_EXTENSIONS.iter().any(|ext| locator.contains(ext))
}

/// True for HLS playlist URLs, extension matched case-insensitively
pub fn is_segmented(url: &str) -> bool {
    url.to_ascii_lowercase().contains(".m3u8")
}

/// Checks whether a URL is already absolute or protocol-relative
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http") || url.starts_with("//")
}
