//! URL handling module for Sumi-Inspect
//!
//! This module loads and validates URL lists, derives the inspection scope
//! from the first URL, and extracts the path features (top-level directory,
//! depth) that results are grouped by.

mod path;
mod site;

pub use path::{path_depth, top_level_directory};
pub use site::derive_site_url;

use crate::{UrlError, UrlResult};

/// Returns true if the string starts with an `http://` or `https://` scheme
pub fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parses a newline-separated URL list
///
/// Lines are trimmed; blank lines and lines without an http(s) scheme are
/// dropped. Order is preserved and duplicates are kept.
///
/// # Examples
///
/// ```
/// use sumi_inspect::url::parse_url_list;
///
/// let urls = parse_url_list("https://a.com/1\n\n  https://a.com/2  \n# comment\n");
/// assert_eq!(urls, vec!["https://a.com/1", "https://a.com/2"]);
/// ```
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let keep = has_http_scheme(line);
            if !keep {
                tracing::debug!("Skipping line without http(s) scheme: {}", line);
            }
            keep
        })
        .map(str::to_string)
        .collect()
}

/// Validates a URL list before a job is started
///
/// # Errors
///
/// * `UrlError::EmptyList` - no URLs
/// * `UrlError::TooMany` - more than `max_urls` entries
/// * `UrlError::InvalidScheme` - the first URL does not start with http(s)
pub fn validate_url_list(urls: &[String], max_urls: usize) -> UrlResult<()> {
    let first = urls.first().ok_or(UrlError::EmptyList)?;

    if urls.len() > max_urls {
        return Err(UrlError::TooMany {
            count: urls.len(),
            max: max_urls,
        });
    }

    if !has_http_scheme(first.trim()) {
        return Err(UrlError::InvalidScheme(format!(
            "First URL must start with http:// or https://, got: {}",
            first
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_has_http_scheme() {
        assert!(has_http_scheme("https://example.com"));
        assert!(has_http_scheme("HTTP://EXAMPLE.COM"));
        assert!(!has_http_scheme("example.com"));
        assert!(!has_http_scheme("ftp://example.com"));
        assert!(!has_http_scheme("http"));
        assert!(!has_http_scheme("é"));
    }

    #[test]
    fn test_parse_url_list_keeps_order_and_duplicates() {
        let parsed = parse_url_list("https://a.com/2\nhttps://a.com/1\nhttps://a.com/2\n");
        assert_eq!(
            parsed,
            urls(&["https://a.com/2", "https://a.com/1", "https://a.com/2"])
        );
    }

    #[test]
    fn test_parse_url_list_handles_crlf() {
        let parsed = parse_url_list("https://a.com/1\r\nhttps://a.com/2\r\n");
        assert_eq!(parsed, urls(&["https://a.com/1", "https://a.com/2"]));
    }

    #[test]
    fn test_validate_empty_list() {
        assert!(matches!(
            validate_url_list(&[], 10),
            Err(UrlError::EmptyList)
        ));
    }

    #[test]
    fn test_validate_too_many() {
        let list = urls(&["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
        assert!(matches!(
            validate_url_list(&list, 2),
            Err(UrlError::TooMany { count: 3, max: 2 })
        ));
        assert!(validate_url_list(&list, 3).is_ok());
    }

    #[test]
    fn test_validate_first_url_scheme() {
        let list = urls(&["a.com/1", "https://a.com/2"]);
        assert!(matches!(
            validate_url_list(&list, 10),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_later_urls_are_not_rejected() {
        // Only the first URL scopes the job; a malformed later URL becomes a per-URL error
        let list = urls(&["https://a.com/1", "garbage"]);
        assert!(validate_url_list(&list, 10).is_ok());
    }
}
