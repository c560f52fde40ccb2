//! Character-based string helpers.
//!
//! All length limits in this workspace count Unicode scalar values, not
//! bytes, so truncation never splits a multi-byte emoji.

/// Number of characters in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Return the first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Count whitespace-separated words.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "😂😂😂abc";
        assert_eq!(truncate_chars(s, 2), "😂😂");
        assert_eq!(truncate_chars(s, 4), "😂😂😂a");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(char_len(s), 6);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }
}
