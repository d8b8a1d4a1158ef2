//! HTML extraction of links and readable text
//!
//! Both extractors are best-effort: malformed markup never produces an error,
//! only less (or empty) output.

use crate::url::normalize_parsed;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose content is never part of the readable text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "title", "tr",
    "ul",
];

/// Extracts followable links from a page, dropping excluded ones
#[derive(Debug, Clone, Default)]
pub struct LinkExtractor {
    /// Lowercased exclusion substrings
    excluded: Vec<String>,
}

impl LinkExtractor {
    /// Creates an extractor that discards any URL containing one of `excluded`
    /// (case-insensitive)
    pub fn new(excluded: Vec<String>) -> Self {
        Self {
            excluded: excluded.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Returns true if the URL contains an excluded substring
    pub fn is_excluded(&self, url: &str) -> bool {
        let lowered = url.to_lowercase();
        self.excluded.iter().any(|sub| lowered.contains(sub.as_str()))
    }

    /// Extracts absolute, normalized, deduplicated links from an HTML page
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href="...">` (unless marked `download`)
    /// - `<link rel="canonical" href="...">`
    /// - `<iframe src="...">` and `<frame src="...">`
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - Fragment-only links
    /// - Non-HTTP(S) URLs after resolution
    /// - URLs containing an exclusion substring
    ///
    /// Relative links are resolved against `base_url`. Duplicates are removed
    /// case-insensitively, keeping the first occurrence.
    pub fn extract(&self, html: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for href in link_targets(&document) {
            let Some(absolute) = resolve_link(href, base_url) else {
                continue;
            };

            let normalized = normalize_parsed(&absolute);
            if self.is_excluded(&normalized) {
                tracing::trace!("Excluded link {}", normalized);
                continue;
            }

            if seen.insert(normalized.to_lowercase()) {
                links.push(normalized);
            }
        }

        links
    }
}

/// Collects raw href/src values of followable elements in document order
fn link_targets(document: &Html) -> Vec<&str> {
    let Ok(selector) = Selector::parse("a[href], link[rel='canonical'][href], iframe[src], frame[src]")
    else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| {
            !(element.value().name() == "a" && element.value().attr("download").is_some())
        })
        .filter_map(|element| {
            element
                .value()
                .attr("href")
                .or_else(|| element.value().attr("src"))
        })
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only references
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Extracts normalized human-readable text from an HTML page
///
/// Script, style, noscript and template content is dropped; anchors contribute
/// their text; entities are decoded by the parser. Block elements start new
/// lines, whitespace within a line collapses to single spaces, runs of blank
/// lines become one paragraph break, and control characters are removed.
///
/// # Example
///
/// ```
/// use site_sift::crawler::extract_text;
///
/// assert_eq!(extract_text("<p>A&nbsp;B</p><script>x</script>"), "A B");
/// ```
pub fn extract_text(html: &str) -> String {
    if html.trim().is_empty() {
        tracing::debug!("Empty page content, no text to extract");
        return String::new();
    }

    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    let is_block = BLOCK_ELEMENTS.contains(&name);
    if is_block {
        out.push('\n');
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }

    if is_block {
        out.push('\n');
    }
}

/// Collapses whitespace line by line and keeps paragraph breaks
fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_break = false;

    for line in raw.lines() {
        let cleaned: String = line
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect();
        let words: Vec<&str> = cleaned.split_whitespace().collect();

        if words.is_empty() {
            pending_break = !out.is_empty();
            continue;
        }

        if !out.is_empty() {
            out.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        pending_break = false;
        out.push_str(&words.join(" "));
    }

    out
}
