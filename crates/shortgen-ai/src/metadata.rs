//! Title, description and tag generation for shorts.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use shortgen_models::MetadataResult;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::config::AiConfig;
use crate::credentials::{ApiKey, CredentialPool};
use crate::description::{compose_long_description, Theme};
use crate::error::{AiError, AiResult};
use crate::lexicon::key_words;
use crate::metrics::{record_fallback, record_request};
use crate::retry::BackoffPolicy;

const OPERATION: &str = "generate_metadata";

/// Key words extracted from the segment by the fallback.
const FALLBACK_KEY_WORDS: usize = 5;

/// Key words interpolated into the fallback title.
const TITLE_KEY_WORDS: usize = 2;

/// Tags used when nothing better is available.
pub const DEFAULT_TAGS: [&str; 28] = [
    "shorts",
    "viral",
    "trending",
    "mustsee",
    "amazing",
    "incredible",
    "shocking",
    "unbelievable",
    "funny",
    "hilarious",
    "entertainment",
    "comedy",
    "emotional",
    "heartwarming",
    "inspiring",
    "motivation",
    "lifestyle",
    "relatable",
    "authentic",
    "genuine",
    "raw",
    "real",
    "moments",
    "reactions",
    "vibes",
    "mood",
    "content",
    "creator",
];

pub fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

fn system_instruction(language: &str) -> String {
    format!(
        "You write metadata for viral short vertical videos. Given a transcript segment and \
the title of the video it was cut from, write metadata in {language}.

Title: under 100 characters, two or three emojis matching the mood, an emotional trigger \
word, a curiosity gap and at least two hashtags.

Description: at least 1500 words. Open with a hook, tell the story of the moment, add \
background about the source video and emotional commentary, call viewers to like, \
subscribe, comment and share, use emojis throughout, spread trending hashtags through the \
text and end with a question for the audience.

Tags: exactly 28 tags mixing broad trending tags, emotion tags, category tags and keyword \
variations, with a combined length under 500 characters."
    )
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["title", "description", "tags"]
    })
}

/// Raw metadata as returned by the service.
#[derive(Debug, Deserialize)]
struct ServiceMetadata {
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
}

/// What the retry loop does after a failed attempt.
#[derive(Debug, PartialEq, Eq)]
enum NextStep {
    /// Try again with whatever key is current.
    Retry,
    /// Give up and use the fallback.
    Stop,
}

/// Generates metadata through Gemini, falling back to local templates.
pub struct MetadataSynthesizer {
    client: GeminiClient,
    pool: Arc<CredentialPool>,
    retry: BackoffPolicy,
    schema: serde_json::Value,
}

impl MetadataSynthesizer {
    pub fn new(config: &AiConfig, pool: Arc<CredentialPool>) -> AiResult<Self> {
        Ok(Self {
            client: GeminiClient::new(config)?,
            pool,
            retry: config.metadata_retry.clone(),
            schema: response_schema(),
        })
    }

    /// Generate metadata for a short. Never fails.
    ///
    /// Overload and quota errors back off exponentially (quota errors also
    /// rotate the key); any other error switches to the next key without
    /// waiting, and stops when there is none. Title and tag limits are
    /// applied to every result.
    pub async fn generate(
        &self,
        segment_text: &str,
        original_title: &str,
        language: &str,
    ) -> MetadataResult {
        let system = system_instruction(language);
        let prompt = format!(
            "Original video title: {original_title}\n\nContent segment: {segment_text}\n\n\
Generate viral short-video metadata with emojis, a 1500+ word description, exactly 28 tags \
and at least 2 hashtags in the title, written in {language}."
        );

        for attempt in 0..self.retry.max_attempts {
            let Some(key) = self.pool.current() else {
                debug!("No Gemini key available, using fallback metadata");
                break;
            };

            match self.request(&key, &system, &prompt).await {
                Ok(raw) => {
                    record_request(OPERATION, true);
                    return finish_service_result(raw, segment_text, original_title);
                }
                Err(error) => {
                    record_request(OPERATION, false);
                    warn!(
                        key_index = key.index() + 1,
                        attempt = attempt + 1,
                        "Gemini metadata generation failed: {}",
                        error
                    );
                    if self.after_failure(&key, &error, attempt).await == NextStep::Stop {
                        break;
                    }
                }
            }
        }

        info!("Gemini metadata unavailable, using fallback");
        record_fallback(OPERATION);
        fallback_metadata(segment_text, original_title)
    }

    async fn after_failure(
        &self,
        key: &ApiKey,
        error: &AiError,
        attempt: u32,
    ) -> NextStep {
        if error.is_retryable() {
            if !self.retry.has_attempt_after(attempt) {
                warn!("All metadata attempts exhausted");
                return NextStep::Stop;
            }
            let delay = self.retry.delay_for_attempt(attempt);
            info!(
                delay_ms = delay.as_millis() as u64,
                "Service busy, backing off before retry"
            );
            tokio::time::sleep(delay).await;
            if error.is_quota() && !self.pool.advance_past(key) {
                return NextStep::Stop;
            }
            return NextStep::Retry;
        }

        if self.pool.advance_past(key) {
            info!("Switched to backup key after error");
            NextStep::Retry
        } else {
            NextStep::Stop
        }
    }

    async fn request(
        &self,
        key: &ApiKey,
        system: &str,
        prompt: &str,
    ) -> AiResult<ServiceMetadata> {
        self.client
            .generate_json(key, system, prompt, &self.schema)
            .await
    }
}

/// Fill missing fields and apply the title and tag contracts.
fn finish_service_result(
    raw: ServiceMetadata,
    segment_text: &str,
    original_title: &str,
) -> MetadataResult {
    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("🔥 VIRAL Moment from {original_title} 😱 #Shorts #Viral"));
    let description = raw
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| {
            compose_long_description(segment_text, original_title, Theme::General)
        });
    let tags = raw
        .tags
        .map(|tags| {
            tags.into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|tags| !tags.is_empty())
        .unwrap_or_else(default_tags);

    MetadataResult {
        title,
        description,
        tags,
    }
    .enforce_limits()
}

/// Deterministic, network-free metadata from theme templates.
pub fn fallback_metadata(segment_text: &str, original_title: &str) -> MetadataResult {
    let key_words = key_words(segment_text, FALLBACK_KEY_WORDS);
    let subject = key_words
        .iter()
        .take(TITLE_KEY_WORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let theme = Theme::detect(segment_text);

    MetadataResult {
        title: theme.title(&subject),
        description: compose_long_description(segment_text, original_title, theme),
        tags: default_tags(),
    }
    .enforce_limits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortgen_models::{MAX_TAGS, MAX_TITLE_CHARS, TAG_BUDGET_CHARS};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    fn synthesizer(server: &MockServer, keys: &[&str]) -> (MetadataSynthesizer, Arc<CredentialPool>) {
        let pool = Arc::new(CredentialPool::new(keys.iter().map(|k| k.to_string())));
        let config = AiConfig::default()
            .with_base_url(server.uri())
            .without_delays();
        (
            MetadataSynthesizer::new(&config, Arc::clone(&pool)).unwrap(),
            pool,
        )
    }

    fn service_reply(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": body.to_string() }] } }]
        }))
    }

    #[test]
    fn test_default_tags_fit_budget() {
        let tags = default_tags();
        assert_eq!(tags.len(), MAX_TAGS);
        assert!(tags.join(", ").chars().count() <= TAG_BUDGET_CHARS);
    }

    #[test]
    fn test_fallback_title_by_theme() {
        let meta = fallback_metadata("That joke was hilarious and everyone laughed", "Show");
        assert_eq!(
            meta.title,
            "😂 HILARIOUS: joke hilarious - You Won't Stop Laughing! 🤣 #Shorts #Viral"
        );

        let meta = fallback_metadata("a calm walk", "Show");
        assert_eq!(meta.title, "🔥 VIRAL: calm walk - Must See This! 😍 #Shorts #Viral");

        let meta = fallback_metadata("", "Show");
        assert_eq!(meta.title, "🔥 VIRAL:  - Must See This! 😍 #Shorts #Viral");
    }

    #[test]
    fn test_fallback_title_is_truncated() {
        let long_words = format!("{} {}", "a".repeat(60), "b".repeat(60));
        let meta = fallback_metadata(&long_words, "Show");
        assert!(meta.title.chars().count() <= MAX_TITLE_CHARS);
        assert!(meta.title.starts_with("🔥 VIRAL: aaaa"));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let a = fallback_metadata("An amazing secret song", "Show");
        let b = fallback_metadata("An amazing secret song", "Show");
        assert_eq!(a, b);
        assert!(a.title.starts_with("🔥 AMAZING"));
    }

    #[tokio::test]
    async fn test_service_result_limits_applied() {
        let server = MockServer::start().await;
        let tags: Vec<String> = (0..40).map(|i| format!("{}{i}", "t".repeat(30))).collect();
        Mock::given(method("POST"))
            .respond_with(service_reply(json!({
                "title": "x".repeat(150),
                "description": "A fine description",
                "tags": tags
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (synth, _) = synthesizer(&server, &["k1"]);
        let meta = synth.generate("segment", "Show", "English").await;
        assert_eq!(meta.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(meta.description, "A fine description");
        assert!(meta.joined_tags_len() <= TAG_BUDGET_CHARS);
        assert!(meta.tags.len() < MAX_TAGS);
        assert_eq!(meta.tags[0], tags[0]);
    }

    #[tokio::test]
    async fn test_service_missing_fields_use_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(service_reply(json!({ "title": "" })))
            .mount(&server)
            .await;

        let (synth, _) = synthesizer(&server, &["k1"]);
        let meta = synth.generate("segment", "Show", "English").await;
        assert_eq!(meta.title, "🔥 VIRAL Moment from Show 😱 #Shorts #Viral");
        assert_eq!(meta.tags, default_tags());
        assert!(meta.description.contains("\"segment\""));
    }

    #[tokio::test]
    async fn test_overload_retries_three_times_then_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("The model is overloaded"))
            .expect(3)
            .mount(&server)
            .await;

        let (synth, pool) = synthesizer(&server, &["k1", "k2"]);
        let meta = synth.generate("funny clip", "Show", "English").await;
        assert_eq!(meta, fallback_metadata("funny clip", "Show"));
        // Overload alone does not rotate.
        assert_eq!(pool.current().unwrap().secret(), "k1");
    }

    #[tokio::test]
    async fn test_quota_rotates_and_retries_on_next_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", "k1"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("key", "k2"))
            .respond_with(service_reply(json!({
                "title": "Fresh title #Shorts #Viral",
                "description": "From the backup key",
                "tags": ["one", "two"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (synth, pool) = synthesizer(&server, &["k1", "k2"]);
        let meta = synth.generate("segment", "Show", "English").await;
        assert_eq!(meta.title, "Fresh title #Shorts #Viral");
        assert_eq!(meta.tags, vec!["one", "two"]);
        assert_eq!(pool.current().unwrap().secret(), "k2");
    }

    #[tokio::test]
    async fn test_other_error_switches_key_without_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .expect(2)
            .mount(&server)
            .await;

        let (synth, pool) = synthesizer(&server, &["k1", "k2"]);
        let meta = synth.generate("segment", "Show", "English").await;
        assert_eq!(meta, fallback_metadata("segment", "Show"));
        assert!(pool.is_exhausted());
    }

    #[tokio::test]
    async fn test_exhausted_pool_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (synth, _) = synthesizer(&server, &[]);
        let meta = synth.generate("segment", "Show", "English").await;
        assert_eq!(meta, fallback_metadata("segment", "Show"));
    }

    /// Prompt carries title, segment and language; the system instruction
    /// names the language and the schema requires all three fields.
    struct MetadataRequestShape;

    impl Match for MetadataRequestShape {
        fn matches(&self, request: &Request) -> bool {
            let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
                return false;
            };
            let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or("");
            let system = body["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .unwrap_or("");

            prompt.contains("Original video title: Late Show Bloopers")
                && prompt.contains("the mic fell into the soup")
                && prompt.contains("written in Spanish")
                && system.contains("write metadata in Spanish")
                && body["generationConfig"]["responseSchema"]["required"]
                    == json!(["title", "description", "tags"])
        }
    }

    #[tokio::test]
    async fn test_request_carries_title_segment_and_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(MetadataRequestShape)
            .respond_with(service_reply(json!({
                "title": "😂 Soup disaster #Shorts #Funny",
                "description": "d",
                "tags": ["funny"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (synth, _) = synthesizer(&server, &["k1"]);
        let result = synth
            .generate("and then the mic fell into the soup", "Late Show Bloopers", "Spanish")
            .await;
        assert_eq!(result.title, "😂 Soup disaster #Shorts #Funny");
    }
}
