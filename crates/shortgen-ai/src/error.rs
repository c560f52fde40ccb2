//! Analysis service error types.

use thiserror::Error;

/// Result type for analysis service operations.
pub type AiResult<T> = Result<T, AiError>;

/// Error text fragments that mean the key ran out of quota.
const QUOTA_INDICATORS: &[&str] = &["429", "resource_exhausted", "quota", "rate limit"];

/// Additional fragments that mean the service is overloaded.
const OVERLOAD_INDICATORS: &[&str] = &["503", "overloaded", "unavailable"];

/// Errors that can occur while calling the analysis service.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Service unavailable ({0}): {1}")]
    TransientService(u16, String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("No usable API key")]
    NoCredential,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Map a non-success HTTP status and its body to an error.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            429 => Self::QuotaExceeded(body),
            401 | 403 => Self::Authentication(body),
            500..=599 => Self::TransientService(status, body),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }

    /// Quota or rate-limit failure; the current key should be rotated out.
    ///
    /// Besides the variant itself, the error text is matched so that quota
    /// errors reported inside other status codes are still recognised.
    pub fn is_quota(&self) -> bool {
        matches!(self, AiError::QuotaExceeded(_)) || text_matches(&self.to_string(), QUOTA_INDICATORS)
    }

    /// Overload, rate-limit, quota or unavailability: worth a backoff.
    pub fn is_overload(&self) -> bool {
        self.is_quota()
            || matches!(self, AiError::TransientService(..))
            || text_matches(&self.to_string(), OVERLOAD_INDICATORS)
    }

    /// Worth another attempt on the same key.
    pub fn is_retryable(&self) -> bool {
        self.is_overload()
            || matches!(
                self,
                AiError::Network(_) | AiError::MalformedResponse(_) | AiError::Json(_)
            )
    }
}

fn text_matches(message: &str, indicators: &[&str]) -> bool {
    let lower = message.to_lowercase();
    indicators.iter().any(|i| lower.contains(i))
}
