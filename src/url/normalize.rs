use crate::UrlError;
use url::Url;

/// Normalizes a URL according to Geo-Ripple's normalization rules
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace and parse; reject if malformed
/// 2. Accept only HTTP and HTTPS schemes
/// 3. Require a non-empty host (parsing already lowercases it)
/// 4. Remove fragment (everything after #)
/// 5. Remove empty query string (trailing ?)
///
/// Parsing also resolves dot segments and turns an empty path into `/`.
///
/// # Examples
///
/// ```
/// use geo_ripple::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM/a/../page?#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
