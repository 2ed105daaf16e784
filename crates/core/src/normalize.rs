//! Text normalization helpers.
//!
//! Handles character-bounded truncation of prompt inputs and the
//! case-insensitive comparisons used for provider tags and layout names.

/// Truncate a string to at most `max_chars` Unicode scalar values.
///
/// Never splits a character; returns the input unchanged when it is short enough.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Normalize a provider tag: trimmed and lowercased.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Case-insensitive equality, using full Unicode lowercasing.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive substring test: does `haystack` contain `needle`?
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        // Each of these is more than one byte in UTF-8
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("→→→→", 2), "→→");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  OpenAI "), "openai");
        assert_eq!(normalize_tag("GEMINI"), "gemini");
        assert_eq!(normalize_tag(""), "");
    }

    #[test]
    fn test_case_insensitive_comparisons() {
        assert!(eq_ignore_case("Title and Content", "title AND content"));
        assert!(!eq_ignore_case("Title and Content", "Title and Contents"));

        assert!(contains_ignore_case("1_Title Only (Dark)", "title only"));
        assert!(!contains_ignore_case("Title", "Title Only"));
    }
}
