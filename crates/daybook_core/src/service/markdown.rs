//! Plain-text summaries of markdown bodies.
//!
//! Rules:
//! - images are dropped, links keep their label;
//! - markdown punctuation is removed and whitespace collapsed;
//! - the first `PREVIEW_MAX_CHARS` chars are kept.

use once_cell::sync::Lazy;
use regex::Regex;

pub const PREVIEW_MAX_CHARS: usize = 100;

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static CHECKBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-*+]\s+\[[ xX]\]\s*").expect("valid checkbox regex"));
static SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!|]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives the list preview for a markdown body; `None` when nothing
/// readable remains.
pub fn preview_text(content: &str) -> Option<String> {
    let without_images = IMAGE_RE.replace_all(content, " ");
    let without_links = LINK_RE.replace_all(&without_images, "$1");
    let without_checkboxes = CHECKBOX_RE.replace_all(&without_links, " ");
    let without_symbols = SYMBOL_RE.replace_all(&without_checkboxes, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
}
