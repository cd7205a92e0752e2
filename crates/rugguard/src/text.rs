//! Text helpers.

/// Max chars of an error message written to the log.
pub const ERROR_PREVIEW_CHARS: usize = 100;

/// Keep at most `max_chars` characters, respecting UTF-8 character boundaries.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Error message shortened for the log.
pub fn error_preview(error: &impl std::fmt::Display, max_chars: usize) -> String {
    truncate_chars(&error.to_string(), max_chars).to_string()
}
