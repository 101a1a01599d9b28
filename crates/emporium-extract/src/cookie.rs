//! Cookie parsing.

use std::collections::HashMap;

use http::{header, HeaderMap};

/// Cookies sent with a request.
///
/// Every `Cookie` header is parsed; when a name repeats, the last value wins.
///
/// # Example
///
/// ```rust
/// use emporium_extract::Cookies;
/// use http::{HeaderMap, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(http::header::COOKIE, HeaderValue::from_static("ads_id=abc123; theme=dark"));
///
/// let cookies = Cookies::from_headers(&headers);
/// assert_eq!(cookies.get("ads_id"), Some("abc123"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    cookies: HashMap<String, String>,
}

impl Cookies {
    /// Create an empty Cookies instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `Cookie` header in `headers`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::new();
        for value in headers.get_all(header::COOKIE) {
            if let Ok(value) = value.to_str() {
                cookies.parse_into(value);
            }
        }
        cookies
    }

    fn parse_into(&mut self, header_value: &str) {
        for pair in header_value.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                // Remove surrounding quotes if present
                let value = value.trim().trim_matches('"');
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }

    /// Get a cookie value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Check if a cookie exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Get the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if there are no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(values: &[&'static str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for v in values {
            map.append(header::COOKIE, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_parse_single_header() {
        let cookies = Cookies::from_headers(&headers(&["a=1; b=2"]));
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("a"), Some("1"));
        assert!(cookies.contains("b"));
    }

    #[test]
    fn test_quoted_values() {
        let cookies = Cookies::from_headers(&headers(&["ads_id=\"xyz\""]));
        assert_eq!(cookies.get("ads_id"), Some("xyz"));
    }

    #[test]
    fn test_multiple_headers_last_wins() {
        let cookies = Cookies::from_headers(&headers(&["a=1", "a=2; c=3"]));
        assert_eq!(cookies.get("a"), Some("2"));
        assert_eq!(cookies.get("c"), Some("3"));
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let cookies = Cookies::from_headers(&headers(&["novalue; =x; ok=yes"]));
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("ok"), Some("yes"));
    }

    #[test]
    fn test_no_cookie_header() {
        let cookies = Cookies::from_headers(&HeaderMap::new());
        assert!(cookies.is_empty());
    }
}
