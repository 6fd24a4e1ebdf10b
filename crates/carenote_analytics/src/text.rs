//! Character-count truncation shared by previews, digests and reports.
//!
//! Budgets count Unicode scalar values, so a cut never splits a code point
//! (a grapheme made of several scalars may still be split).

/// The first `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncated text followed by an ellipsis marker. The marker is always
/// appended, matching how previews are rendered everywhere.
pub fn preview(s: &str, max_chars: usize) -> String {
    format!("{}...", truncate_chars(s, max_chars))
}
