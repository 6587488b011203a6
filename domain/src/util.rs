//! Shared utility functions.

use std::borrow::Cow;

/// Shorten `s` to at most `max_chars` characters for log lines and
/// progress output, appending `...` when something was cut.
pub fn preview(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        None => Cow::Borrowed(s),
        Some((end, _)) => Cow::Owned(format!("{}...", &s[..end])),
    }
}

/// Single-line version of [`preview`]; newlines become spaces.
pub fn preview_line(s: &str, max_chars: usize) -> String {
    preview(s, max_chars).replace(['\n', '\r'], " ")
}
