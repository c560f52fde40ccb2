//! Keyword lexicons shared by the local analysis and metadata fallbacks.
//!
//! Matching is a plain substring test on the lowercased text, so "wow"
//! also counts inside "wowed".

pub const ENGAGEMENT_WORDS: &[&str] = &[
    "amazing",
    "incredible",
    "wow",
    "shocking",
    "unbelievable",
    "funny",
    "hilarious",
    "awesome",
    "fantastic",
    "mind-blowing",
    "crazy",
    "insane",
    "epic",
    "legendary",
];

pub const EMOTION_WORDS: &[&str] = &[
    "love",
    "hate",
    "excited",
    "surprised",
    "happy",
    "angry",
    "scared",
    "thrilled",
    "disappointed",
    "frustrated",
    "overwhelmed",
    "passionate",
    "emotional",
    "heartwarming",
];

pub const VIRAL_WORDS: &[&str] = &[
    "viral",
    "trending",
    "share",
    "like",
    "subscribe",
    "follow",
    "must-see",
    "breaking",
    "exclusive",
    "revealed",
    "secret",
    "exposed",
    "truth",
    "shocking",
];

pub const QUOTABLE_WORDS: &[&str] = &[
    "said", "quote", "tells", "explains", "reveals", "admits", "confesses", "announces",
];

/// Words skipped when picking keywords.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
    "was", "were", "a", "an", "this", "that",
];

/// Emotion categories in detection priority order.
pub const EMOTION_CATEGORIES: &[(&str, &[&str])] = &[
    ("humor", &["funny", "hilarious", "joke", "laugh"]),
    ("surprise", &["shocking", "surprised", "unexpected"]),
    ("inspiration", &["love", "heartwarming", "beautiful"]),
    ("controversy", &["angry", "frustrated", "hate"]),
];

/// Number of lexicon entries occurring in `lower` (already lowercased).
pub fn count_matches(lower: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| lower.contains(*w)).count()
}

/// Whether any lexicon entry occurs in `lower` (already lowercased).
pub fn contains_any(lower: &str, words: &[&str]) -> bool {
    words.iter().any(|w| lower.contains(w))
}

/// First `limit` words of `text` longer than three characters that are
/// not stop words, in original order and case.
pub fn key_words(text: &str, limit: usize) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_is_substring_based() {
        assert_eq!(count_matches("wowed by this epic clip", ENGAGEMENT_WORDS), 2);
        assert_eq!(count_matches("nothing here", ENGAGEMENT_WORDS), 0);
    }

    #[test]
    fn test_key_words_keeps_order_and_case() {
        let words = key_words("This is absolutely Amazing and hilarious, shocking everyone!", 8);
        assert_eq!(
            words,
            vec!["absolutely", "Amazing", "hilarious,", "shocking", "everyone!"]
        );
    }

    #[test]
    fn test_key_words_skips_long_stop_words() {
        assert_eq!(key_words("that THIS were with", 5), Vec::<String>::new());
        assert_eq!(key_words("alpha bravo charlie delta", 2), vec!["alpha", "bravo"]);
    }

    #[test]
    fn test_analysis_keywords_share_metadata_stop_words() {
        // One stop-word set serves both analysis keywords and metadata key
        // words, so "This"/"that" never surface as analysis keywords even
        // though they pass the length filter.
        let words = key_words("This clip proves that timing matters", 10);
        assert_eq!(words, vec!["clip", "proves", "timing", "matters"]);
        assert!(STOP_WORDS.contains(&"this") && STOP_WORDS.contains(&"that"));
    }
}
