//! Segment analysis scores.

use serde::{Deserialize, Serialize};

use crate::text::truncate_chars;

/// Maximum number of emotion tags kept on a result.
pub const MAX_EMOTIONS: usize = 5;

/// Maximum number of keywords kept on a result.
pub const MAX_KEYWORDS: usize = 10;

/// Maximum length of the reason string, in characters.
pub const MAX_REASON_CHARS: usize = 500;

/// Emotion tag used when nothing more specific was detected.
pub const GENERAL_EMOTION: &str = "general";

/// Engagement/virality scores for a transcript segment.
///
/// Produced either by the analysis service or by the local heuristic.
/// Always pass through [`AnalysisResult::clamped`] before handing a
/// result to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub engagement_score: f64,
    pub emotion_score: f64,
    pub viral_potential: f64,
    pub quotability: f64,
    pub emotions: Vec<String>,
    pub keywords: Vec<String>,
    pub reason: String,
}

impl AnalysisResult {
    /// Force every field into its contract.
    ///
    /// Scores are clamped to `[0.0, 1.0]` (NaN becomes 0.0), emotions are
    /// capped at five and never left empty, keywords are capped at ten and
    /// the reason at 500 characters.
    pub fn clamped(mut self) -> Self {
        self.engagement_score = clamp_score(self.engagement_score);
        self.emotion_score = clamp_score(self.emotion_score);
        self.viral_potential = clamp_score(self.viral_potential);
        self.quotability = clamp_score(self.quotability);

        self.emotions.retain(|e| !e.trim().is_empty());
        self.emotions.truncate(MAX_EMOTIONS);
        if self.emotions.is_empty() {
            self.emotions.push(GENERAL_EMOTION.to_string());
        }

        self.keywords.truncate(MAX_KEYWORDS);
        self.reason = truncate_chars(&self.reason, MAX_REASON_CHARS);
        self
    }

    /// All four scores, in declaration order.
    pub fn scores(&self) -> [f64; 4] {
        [
            self.engagement_score,
            self.emotion_score,
            self.viral_potential,
            self.quotability,
        ]
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> AnalysisResult {
        AnalysisResult {
            engagement_score: 1.7,
            emotion_score: -0.2,
            viral_potential: f64::NAN,
            quotability: 0.42,
            emotions: (0..8).map(|i| format!("e{i}")).collect(),
            keywords: (0..15).map(|i| format!("k{i}")).collect(),
            reason: "x".repeat(900),
        }
    }

    #[test]
    fn test_clamped_enforces_ranges() {
        let result = raw().clamped();
        assert_eq!(result.engagement_score, 1.0);
        assert_eq!(result.emotion_score, 0.0);
        assert_eq!(result.viral_potential, 0.0);
        assert_eq!(result.quotability, 0.42);
        assert_eq!(result.emotions.len(), MAX_EMOTIONS);
        assert_eq!(result.keywords.len(), MAX_KEYWORDS);
        assert_eq!(result.reason.chars().count(), MAX_REASON_CHARS);
    }

    #[test]
    fn test_clamped_fills_empty_emotions() {
        let mut r = raw();
        r.emotions = vec!["  ".to_string()];
        let result = r.clamped();
        assert_eq!(result.emotions, vec![GENERAL_EMOTION.to_string()]);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(raw().clamped()).unwrap();
        for field in [
            "engagement_score",
            "emotion_score",
            "viral_potential",
            "quotability",
            "emotions",
            "keywords",
            "reason",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
