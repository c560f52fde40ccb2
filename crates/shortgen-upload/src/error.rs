//! Upload and storage error types.

use std::path::PathBuf;

use shortgen_models::ModelError;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors raised by job and credential stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Errors that can occur while uploading a short.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("Video file not found: {}", .0.display())]
    MediaNotFound(PathBuf),

    #[error("Upload quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Service unavailable ({0}): {1}")]
    TransientService(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request rejected ({0}): {1}")]
    Rejected(u16, String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthenticationFailure(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Map a non-success HTTP status and its body to an error.
    ///
    /// YouTube reports quota problems as 403 with a `quotaExceeded` or
    /// `uploadLimitExceeded` reason, so the body is checked first.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let lower = body.to_lowercase();
        if status == 429 || lower.contains("quotaexceeded") || lower.contains("uploadlimitexceeded") {
            return Self::QuotaExceeded(body);
        }
        match status {
            401 | 403 => Self::AuthenticationFailure(body),
            500..=599 => Self::TransientService(status, body),
            _ => Self::Rejected(status, body),
        }
    }

    /// Short stable label, used as the prefix of persisted error text.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::AuthenticationFailure(_) => "authentication_failure",
            UploadError::MediaNotFound(_) => "media_not_found",
            UploadError::QuotaExceeded(_) => "quota_exceeded",
            UploadError::TransientService(..) => "transient_service",
            UploadError::MalformedResponse(_) => "malformed_response",
            UploadError::Rejected(..) => "rejected",
            UploadError::Store(_) => "store",
            UploadError::Network(_) => "network",
            UploadError::Io(_) => "io",
            UploadError::Json(_) => "json",
        }
    }

    /// Text stored in `upload_error` for a failed short.
    pub fn to_record_text(&self) -> String {
        format!("[{}] {}", self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert!(matches!(
            UploadError::from_http_status(401, "invalid_grant"),
            UploadError::AuthenticationFailure(_)
        ));
        assert!(matches!(
            UploadError::from_http_status(403, r#"{"reason":"quotaExceeded"}"#),
            UploadError::QuotaExceeded(_)
        ));
        assert!(matches!(
            UploadError::from_http_status(503, "backend error"),
            UploadError::TransientService(503, _)
        ));
        assert!(matches!(
            UploadError::from_http_status(400, "bad"),
            UploadError::Rejected(400, _)
        ));
    }

    #[test]
    fn test_record_text_has_kind_prefix() {
        let err = UploadError::MediaNotFound(PathBuf::from("/out/2.mp4"));
        assert_eq!(
            err.to_record_text(),
            "[media_not_found] Video file not found: /out/2.mp4"
        );
    }
}
