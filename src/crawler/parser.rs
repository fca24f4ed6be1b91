//! HTML link extraction
//!
//! The extractor returns raw `href` values exactly as written in the page.
//! Deciding which of them are admissible crawl targets is left to
//! [`parse_candidate`](crate::url::parse_candidate).

use scraper::{Html, Selector};

/// Link extraction collaborator
///
/// Synchronous on purpose: the parsed DOM is not `Send` and must be gone
/// before the worker awaits again.
pub trait LinkExtractor: Send + Sync {
    /// Returns every raw href candidate found in `body`
    fn extract_links(&self, body: &str) -> Vec<String>;
}

/// [`LinkExtractor`] that reads `<a href>` attributes with scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str) -> Vec<String> {
        extract_hrefs(body)
    }
}

/// Extracts the raw `href` of every anchor in the document
///
/// # Example
///
/// ```
/// use geo_ripple::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="https://example.com/a">A</a><a href="/b">B</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["https://example.com/a", "/b"]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
