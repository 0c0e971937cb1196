//! Content extraction: raw HTML → clean text.
//!
//! Selects the content region of a fetched page (configured CSS selector, or
//! a fallback chain of common containers), converts it to Markdown via
//! `htmd`, and normalizes whitespace. The caller only sees "text content or
//! failure"; the heuristics live here.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use askbase_shared::{AskbaseError, Result};

/// Content containers tried when no selector is configured (or the configured
/// one matches nothing), in priority order.
const FALLBACK_SELECTORS: [&str; 3] = ["main", "article", "body"];

/// Extract the text content of an HTML page.
///
/// When `selector` is non-empty, the inner HTML of *every* matching element
/// is taken, in document order — listing pages carry their payload across
/// many repeated cards, not a single container. Returns an error when the
/// page yields no text at all: an empty record would be a placeholder, and
/// placeholders are never persisted.
pub fn extract_text(html: &str, selector: &str) -> Result<String> {
    let doc = Html::parse_document(html);

    let content_html = select_content(&doc, selector)
        .ok_or_else(|| AskbaseError::extract("no content region matched"))?;

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "nav", "iframe", "noscript", "svg"])
        .build();

    let markdown = converter
        .convert(&content_html)
        .map_err(|e| AskbaseError::extract(format!("htmd conversion failed: {e}")))?;

    let text = collapse_blank_lines(markdown.trim());
    if text.is_empty() {
        return Err(AskbaseError::extract("page yielded no text content"));
    }

    debug!(chars = text.chars().count(), "content extracted");
    Ok(text)
}

/// Gather the content HTML according to the selector policy.
fn select_content(doc: &Html, selector: &str) -> Option<String> {
    if !selector.is_empty() {
        if let Ok(sel) = Selector::parse(selector) {
            let matched: Vec<String> = doc.select(&sel).map(|el| el.inner_html()).collect();
            if !matched.is_empty() {
                return Some(matched.join("\n"));
            }
            debug!(selector, "configured selector matched nothing, falling back");
        } else {
            debug!(selector, "configured selector failed to parse, falling back");
        }
    }

    for sel_str in &FALLBACK_SELECTORS {
        let sel = Selector::parse(sel_str).expect("static selector");
        if let Some(el) = doc.select(&sel).next() {
            return Some(el.inner_html());
        }
    }

    None
}

/// Collapse runs of three or more newlines down to two.
fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}
