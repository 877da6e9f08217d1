//! Inline markup cleanup for extracted description text.
//!
//! Each pass is a function `&str -> String` applied in sequence: images are
//! dropped, links are reduced to their text, emphasis/code markers removed,
//! and whitespace collapsed.

use std::sync::LazyLock;

use regex::Regex;

/// Reduce a joined paragraph of markdown to plain text.
pub(crate) fn strip_inline_markup(text: &str) -> String {
    let result = strip_images(text);
    let result = strip_links(&result);
    let result = strip_emphasis(&result);
    collapse_whitespace(&result)
}

/// Remove image syntax `![alt](url)` entirely.
fn strip_images(text: &str) -> String {
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));

    IMAGE_RE.replace_all(text, "").to_string()
}

/// Reduce link syntax `[text](url)` to the bare link text.
fn strip_links(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]+\)").expect("valid regex"));

    LINK_RE.replace_all(text, "$1").to_string()
}

/// Remove emphasis and inline-code markers.
fn strip_emphasis(text: &str) -> String {
    static EMPHASIS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new("[*_`]").expect("valid regex"));

    EMPHASIS_RE.replace_all(text, "").to_string()
}

/// Collapse whitespace runs left behind by the removal passes.
fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

    WS_RE.replace_all(text, " ").to_string()
}
