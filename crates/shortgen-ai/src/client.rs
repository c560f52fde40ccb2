//! Minimal Gemini REST client with schema-constrained JSON output.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::credentials::ApiKey;
use crate::error::{AiError, AiResult};

/// Gemini API client. The key is supplied per call so that the pool can
/// rotate keys without rebuilding the client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a client from config.
    pub fn new(config: &AiConfig) -> AiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shortgen-ai/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Call `generateContent` and decode the returned JSON text into `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        key: &ApiKey,
        system_instruction: &str,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> AiResult<T> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        debug!(model = %self.model, key_index = key.index() + 1, "Calling Gemini");

        let response = self
            .http
            .post(&url)
            .query(&[("key", key.secret())])
            .json(&request)
            .send()
            .await
            // The URL carries the key.
            .map_err(|e| AiError::Network(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::from_http_status(status.as_u16(), body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AiError::malformed(format!("Failed to parse Gemini response: {e}")))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AiError::malformed("No content in Gemini response"))?;

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| AiError::malformed(format!("Failed to parse model JSON: {e}")))
    }
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialPool;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Echo {
        value: u32,
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    fn key() -> ApiKey {
        CredentialPool::new(vec!["test-key".to_string()])
            .current()
            .unwrap()
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[tokio::test]
    async fn test_generate_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("```json\n{\"value\": 7}\n```")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&AiConfig::default().with_base_url(server.uri())).unwrap();
        let echo: Echo = client
            .generate_json(&key(), "sys", "prompt", &json!({"type": "OBJECT"}))
            .await
            .unwrap();
        assert_eq!(echo.value, 7);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&AiConfig::default().with_base_url(server.uri())).unwrap();
        let err = client
            .generate_json::<Echo>(&key(), "sys", "prompt", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&AiConfig::default().with_base_url(server.uri())).unwrap();
        let err = client
            .generate_json::<Echo>(&key(), "sys", "prompt", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::MalformedResponse(_)));
        assert!(err.is_retryable());
    }
}
