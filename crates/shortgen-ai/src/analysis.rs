//! Engagement and virality scoring for transcript segments.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use shortgen_models::analysis::GENERAL_EMOTION;
use shortgen_models::text::{truncate_chars, word_count};
use shortgen_models::AnalysisResult;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::config::AiConfig;
use crate::credentials::{ApiKey, CredentialPool};
use crate::error::{AiError, AiResult};
use crate::lexicon::{
    contains_any, count_matches, key_words, EMOTION_CATEGORIES, EMOTION_WORDS, ENGAGEMENT_WORDS,
    QUOTABLE_WORDS, VIRAL_WORDS,
};
use crate::metrics::{record_fallback, record_request};
use crate::retry::{retry_async, BackoffPolicy, RetryResult};

const OPERATION: &str = "analyze_segment";

/// Characters of segment text sent to the service.
pub const PROMPT_SEGMENT_CHARS: usize = 1000;

/// Keywords kept by the local heuristic.
const FALLBACK_KEYWORDS: usize = 8;

const SYSTEM_INSTRUCTION: &str = "You are a content analyst who judges how well a transcript \
segment would work as a short vertical video.

Score the segment on four axes, each between 0.0 and 1.0:
- engagement_score: how likely viewers are to keep watching
- emotion_score: how strong the emotional impact is
- viral_potential: how likely viewers are to share it
- quotability: how memorable and repeatable its lines are

Also return up to five detected emotions (for example humor, surprise, excitement, \
inspiration, controversy), up to ten keywords that carry the segment, and a one or two \
sentence reason.

Favour segments with a clear hook, an unexpected turn, humour, inspiration, debate-worthy \
opinions, a complete mini story or a line people will quote.";

/// Raw analysis as returned by the service; absent fields get neutral defaults.
#[derive(Debug, Deserialize)]
struct ServiceAnalysis {
    #[serde(default = "neutral_score")]
    engagement_score: f64,
    #[serde(default = "neutral_score")]
    emotion_score: f64,
    #[serde(default = "neutral_score")]
    viral_potential: f64,
    #[serde(default = "neutral_score")]
    quotability: f64,
    #[serde(default)]
    emotions: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default = "default_reason")]
    reason: String,
}

fn neutral_score() -> f64 {
    0.5
}

fn default_reason() -> String {
    "Content has potential for engagement".to_string()
}

impl From<ServiceAnalysis> for AnalysisResult {
    fn from(raw: ServiceAnalysis) -> Self {
        AnalysisResult {
            engagement_score: raw.engagement_score,
            emotion_score: raw.emotion_score,
            viral_potential: raw.viral_potential,
            quotability: raw.quotability,
            emotions: raw.emotions,
            keywords: raw.keywords,
            reason: raw.reason,
        }
        .clamped()
    }
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "engagement_score": { "type": "NUMBER" },
            "emotion_score": { "type": "NUMBER" },
            "viral_potential": { "type": "NUMBER" },
            "quotability": { "type": "NUMBER" },
            "emotions": { "type": "ARRAY", "items": { "type": "STRING" } },
            "keywords": { "type": "ARRAY", "items": { "type": "STRING" } },
            "reason": { "type": "STRING" }
        },
        "required": [
            "engagement_score", "emotion_score", "viral_potential", "quotability",
            "emotions", "keywords", "reason"
        ]
    })
}

/// Scores segments through Gemini, falling back to a local heuristic.
pub struct AnalysisEngine {
    client: GeminiClient,
    pool: Arc<CredentialPool>,
    retry: BackoffPolicy,
    schema: serde_json::Value,
}

impl AnalysisEngine {
    pub fn new(config: &AiConfig, pool: Arc<CredentialPool>) -> AiResult<Self> {
        Ok(Self {
            client: GeminiClient::new(config)?,
            pool,
            retry: config.analysis_retry.clone(),
            schema: response_schema(),
        })
    }

    /// Score a segment. Never fails: any service problem yields the
    /// deterministic fallback result.
    ///
    /// A quota error rotates the pool, but this call still returns the
    /// fallback; the next key is used from the next call on.
    pub async fn score(&self, segment_text: &str) -> AnalysisResult {
        let Some(key) = self.pool.current() else {
            debug!("No Gemini key available, using fallback analysis");
            record_fallback(OPERATION);
            return fallback_analysis(segment_text);
        };

        let prompt = format!(
            "Analyze this content segment for short-form video potential:\n\n{}",
            truncate_chars(segment_text, PROMPT_SEGMENT_CHARS)
        );

        let outcome = retry_async(&self.retry, OPERATION, AiError::is_retryable, || {
            self.request(&key, &prompt)
        })
        .await;

        match outcome {
            RetryResult::Success(result) => {
                record_request(OPERATION, true);
                result
            }
            RetryResult::Failed { error, attempts } => {
                record_request(OPERATION, false);
                warn!(
                    key_index = key.index() + 1,
                    attempts,
                    "Gemini analysis failed: {}",
                    error
                );
                if error.is_quota() && self.pool.advance_past(&key) {
                    info!("Backup key will be used from the next analysis on");
                }
                record_fallback(OPERATION);
                fallback_analysis(segment_text)
            }
        }
    }

    async fn request(&self, key: &ApiKey, prompt: &str) -> AiResult<AnalysisResult> {
        let raw: ServiceAnalysis = self
            .client
            .generate_json(key, SYSTEM_INSTRUCTION, prompt, &self.schema)
            .await?;
        Ok(raw.into())
    }
}

/// Deterministic, network-free scoring from keyword lexicons and length.
pub fn fallback_analysis(text: &str) -> AnalysisResult {
    let lower = text.to_lowercase();
    let words = word_count(text);

    let lexicon_score =
        |lexicon: &[&str], weight: f64| (count_matches(&lower, lexicon) as f64 * weight).min(1.0);

    let length_bonus = if (20..=50).contains(&words) {
        0.2
    } else if (10..=80).contains(&words) {
        0.1
    } else {
        0.0
    };
    let with_bonus = |score: f64, floor: f64| (score + length_bonus).min(1.0).max(floor);

    let mut emotions: Vec<String> = EMOTION_CATEGORIES
        .iter()
        .filter(|(_, triggers)| contains_any(&lower, triggers))
        .map(|(name, _)| name.to_string())
        .collect();
    if emotions.is_empty() {
        emotions.push(GENERAL_EMOTION.to_string());
    }

    let reason = format!(
        "Fallback analysis: {} words, detected {} content",
        words,
        emotions.join(", ")
    );

    AnalysisResult {
        engagement_score: with_bonus(lexicon_score(ENGAGEMENT_WORDS, 0.15), 0.4),
        emotion_score: with_bonus(lexicon_score(EMOTION_WORDS, 0.15), 0.3),
        viral_potential: with_bonus(lexicon_score(VIRAL_WORDS, 0.2), 0.3),
        quotability: with_bonus(lexicon_score(QUOTABLE_WORDS, 0.2), 0.2),
        emotions,
        keywords: key_words(text, FALLBACK_KEYWORDS),
        reason,
    }
    .clamped()
}
