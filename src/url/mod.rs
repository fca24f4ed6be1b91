//! URL handling module for Geo-Ripple
//!
//! This module decides which raw href candidates are admissible as crawl work
//! and brings admissible ones into the normalized form used as dedup keys.

mod normalize;

pub use normalize::normalize_url;

use ::url::Url;

/// Parses a raw href candidate into an admissible crawl URL
///
/// A candidate is admissible when it is an absolute URL carrying both a
/// scheme and a host. Relative links, fragments and pseudo-schemes such as
/// `javascript:` are rejected, as is anything with a scheme the fetcher
/// cannot retrieve.
///
/// # Returns
///
/// * `Some(Url)` - The normalized URL
/// * `None` - The candidate must be dropped
///
/// # Examples
///
/// ```
/// use geo_ripple::url::parse_candidate;
///
/// assert!(parse_candidate("https://example.com/about").is_some());
/// assert!(parse_candidate("/relative/path").is_none());
/// assert!(parse_candidate("#fragment").is_none());
/// ```
pub fn parse_candidate(href: &str) -> Option<Url> {
    match normalize_url(href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::trace!("Dropping link candidate {:?}: {}", href, e);
            None
        }
    }
}
