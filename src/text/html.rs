//! HTML to plain text using lol_html for streaming processing

use lol_html::html_content::ContentType;
use lol_html::{doc_text, element, rewrite_str, text, RewriteStrSettings};
use once_cell::sync::Lazy;
use regex::Regex;

/// Elements that start a new line in the extracted text
const BLOCK_TAGS: [&str; 10] = ["br", "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements whose content never reaches the extracted text
const HIDDEN_TAGS: [&str; 3] = ["script", "style", "noscript"];

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static H1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Errors during HTML text extraction
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Strip an HTML page down to its visible text.
///
/// Only the first `<main>` region is considered, falling back to the first
/// `<article>` and then the whole document. Block elements start a new line,
/// entities are decoded and non-breaking spaces become plain spaces.
pub fn strip_html(html: &str) -> Result<String, TextError> {
    let region = content_region(html);

    let mut handlers = Vec::with_capacity(HIDDEN_TAGS.len() + BLOCK_TAGS.len());
    for tag in HIDDEN_TAGS {
        handlers.push(element!(tag, |el| {
            el.remove();
            Ok(())
        }));
    }
    for tag in BLOCK_TAGS {
        handlers.push(element!(tag, |el| {
            el.before("\n", ContentType::Text);
            Ok(())
        }));
    }

    let cleaned = rewrite_str(
        region,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| TextError::Rewrite(e.to_string()))?;

    let mut text = String::with_capacity(cleaned.len());
    rewrite_str(
        &cleaned,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!(|chunk| {
                text.push_str(chunk.as_str());
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| TextError::Rewrite(e.to_string()))?;

    Ok(decode_text(&text))
}

/// Collect the text content of the elements matching `selector`.
///
/// Returns `None` when nothing matched or the match has no text.
pub fn element_text(html: &str, selector: &str) -> Result<Option<String>, TextError> {
    let mut collected = String::new();
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![text!(selector, |chunk| {
                collected.push_str(chunk.as_str());
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| TextError::Rewrite(e.to_string()))?;

    let text = collapse_whitespace(&decode_text(&collected));
    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Text of the page `<title>` and first `<h1>`, joined by a space.
///
/// Regex-based so it also works on truncated or malformed pages.
pub fn html_title_text(html: &str) -> String {
    let pieces: Vec<String> = [&*TITLE_RE, &*H1_RE]
        .iter()
        .filter_map(|re| re.captures(html))
        .filter_map(|caps| caps.get(1))
        .map(|m| collapse_whitespace(&decode_text(&TAG_RE.replace_all(m.as_str(), " "))))
        .filter(|s| !s.is_empty())
        .collect();
    pieces.join(" ")
}

/// Collapse every whitespace run into a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

fn decode_text(text: &str) -> String {
    html_escape::decode_html_entities(text).replace('\u{a0}', " ")
}

/// First `<main>` region, else first `<article>`, else the whole page
fn content_region(html: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with the original
    let lower = html.to_ascii_lowercase();
    for (open, close) in [("<main", "</main>"), ("<article", "</article>")] {
        let Some(start) = lower.find(open) else {
            continue;
        };
        let Some(tag_len) = lower[start..].find('>') else {
            continue;
        };
        let body_start = start + tag_len + 1;
        if let Some(len) = lower[body_start..].find(close) {
            return &html[body_start..body_start + len];
        }
    }
    html
}
