//! Description extraction from raw skill markdown.
//!
//! Given the raw content of a SKILL.md or README, [`extract_description`]
//! pulls out the first real paragraph of prose:
//! 1. Strips a leading `---` front-matter block if present
//! 2. Skips the leading blank run and the first heading line
//! 3. Accumulates non-empty lines until the first blank line after content,
//!    dropping pure heading, code-fence, and checklist lines along the way
//! 4. Joins the lines with single spaces and strips inline markup
//! 5. Truncates to 200 characters; anything under 11 characters is discarded

mod cleanup;

use tracing::trace;

/// Maximum length of an extracted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Extractions shorter than this are treated as no description.
pub const MIN_DESCRIPTION_CHARS: usize = 11;

/// Appended when the description is cut at [`MAX_DESCRIPTION_CHARS`].
const TRUNCATION_MARKER: char = '…';

/// Extract a short description from raw markdown text.
///
/// Returns `None` when the text yields nothing usable.
pub fn extract_description(raw: &str) -> Option<String> {
    let body = strip_front_matter(raw);

    let mut collected: Vec<&str> = Vec::new();
    let mut skipped_heading = false;

    for line in body.lines() {
        let trimmed = line.trim();

        if collected.is_empty() {
            if trimmed.is_empty() {
                continue;
            }
            if !skipped_heading && is_heading(trimmed) {
                skipped_heading = true;
                continue;
            }
        } else if trimmed.is_empty() {
            // First blank line after content ends the paragraph.
            break;
        }

        if is_heading(trimmed) || is_code_fence(trimmed) || is_checklist(trimmed) {
            continue;
        }
        collected.push(trimmed);
    }

    if collected.is_empty() {
        trace!("no paragraph content found");
        return None;
    }

    let joined = collected.join(" ");
    let cleaned = cleanup::strip_inline_markup(&joined);
    let cleaned = cleaned.trim();

    if cleaned.chars().count() < MIN_DESCRIPTION_CHARS {
        trace!(len = cleaned.len(), "extracted text too short, discarding");
        return None;
    }

    Some(truncate(cleaned))
}

/// Strip a leading `---` delimited front-matter block.
///
/// An unterminated block is left untouched.
fn strip_front_matter(raw: &str) -> &str {
    if !(raw.starts_with("---\n") || raw.starts_with("---\r\n")) {
        return raw;
    }

    let after = &raw[raw.find('\n').expect("checked prefix") + 1..];
    let mut pos = 0;
    for line in after.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return &after[pos + line.len()..];
        }
        pos += line.len();
    }
    raw
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#')
}

fn is_code_fence(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

fn is_checklist(line: &str) -> bool {
    let rest = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "));
    matches!(rest, Some(r) if r.starts_with("[ ]") || r.starts_with("[x]") || r.starts_with("[X]"))
}

/// Cut to [`MAX_DESCRIPTION_CHARS`] characters, appending the truncation marker.
fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    format!("{}{TRUNCATION_MARKER}", cut.trim_end())
}
