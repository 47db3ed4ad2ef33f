//! HTML parser for extracting links and text
//!
//! This module handles turning a fetched body into:
//! - The raw `href` targets of every anchor, in document order
//! - A normalized plain-text rendering of the page
//! - The page title
//!
//! Extraction is best effort. Malformed markup yields whatever links and text
//! the HTML5 parser recovers, never an error.

use crate::crawler::FetchedPage;
use encoding_rs::{Encoding, UTF_8};
use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Anchor targets exactly as written in the document
    pub links: Vec<String>,

    /// Text content with whitespace collapsed to single spaces
    pub text: String,
}

/// Decodes a response body using the announced charset
///
/// Labels follow the WHATWG encoding registry, so `ISO-8859-1` is read as
/// windows-1252. A missing or unknown label falls back to UTF-8 with invalid
/// sequences replaced.
pub fn decode_body(body: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|cs| Encoding::for_label(cs.trim().as_bytes()))
        .unwrap_or(UTF_8);

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::trace!("Replaced malformed {} sequences in body", encoding.name());
    }
    text.into_owned()
}

/// Decoded text of a fetched body
pub fn body_text(page: &FetchedPage) -> String {
    decode_body(&page.body, page.charset())
}

/// Parses HTML content and extracts links, text and title
///
/// # Example
///
/// ```
/// use sitegraph::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document),
        text: extract_text(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn extract_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for word in root.text().flat_map(str::split_whitespace) {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(word);
    }
    text
}
