//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Outgoing links, normalized against the page URL

use crate::url::normalize_link;
use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Text of the first `<title>` element as written, empty if there is none
    pub title: String,

    /// Normalized `href` of every anchor, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and outgoing links
///
/// # Link Extraction Rules
///
/// - Every `<a>` element with a non-empty `href` is considered
/// - The `href` is resolved with [`normalize_link`] against `base_url`
/// - Links with other schemes (`mailto:`, `javascript:`, `tel:`) are kept
///   as written; the traversal never follows them
///
/// Malformed markup never fails: the parser recovers what it can and
/// missing pieces come back empty.
///
/// # Example
///
/// ```
/// use crawlet::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html, "https://example.com/");
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .unwrap_or_default()
}

/// Extracts the normalized `href` of every anchor that carries one
fn extract_links(document: &Html, base_url: &str) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| normalize_link(base_url, href))
        .collect()
}
