//! HTML link extraction
//!
//! The crawl frontier only needs "absolute hyperlink targets of a page", so
//! extraction sits behind the [`LinkExtractor`] trait and the scraper-based
//! [`HtmlLinkExtractor`] is the default implementation.

use scraper::{Html, Selector};
use url::Url;

/// Turns raw page content into absolute hyperlink targets
pub trait LinkExtractor: Send + Sync {
    /// Extracts absolute link targets from `content`
    ///
    /// Relative links resolve against `base`. Content that cannot be
    /// parsed yields no links rather than an error.
    fn extract_links(&self, content: &str, base: &Url) -> Vec<Url>;
}

/// Extracts `<a href>` targets using scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    /// Collects `<a href>` targets in document order
    ///
    /// `download` links are kept. `javascript:`, `mailto:`, `tel:` and
    /// `data:` hrefs, fragment-only hrefs and anything that does not
    /// resolve to HTTP(S) are dropped.
    fn extract_links(&self, content: &str, base: &Url) -> Vec<Url> {
        let document = Html::parse_document(content);
        extract_links(&document, base)
    }
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
