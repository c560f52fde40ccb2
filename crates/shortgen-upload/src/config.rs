//! Upload client configuration.

use std::time::Duration;

/// Resumable uploads must send chunks in multiples of this size.
pub const CHUNK_GRANULARITY: usize = 256 * 1024;

/// Default chunk size (8 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Configuration for the YouTube client and the identity provider.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Resumable upload endpoint for `videos.insert`
    pub upload_url: String,
    /// OAuth token endpoint used for refresh
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Bytes per chunk; always a multiple of [`CHUNK_GRANULARITY`]
    pub chunk_size: usize,
    /// Per-request timeout (each chunk is one request)
    pub timeout: Duration,
    /// Video category ("22" is People & Blogs)
    pub category_id: String,
    /// Default metadata and audio language
    pub default_language: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://www.googleapis.com/upload/youtube/v3/videos".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: Duration::from_secs(300),
            category_id: "22".to_string(),
            default_language: "en".to_string(),
        }
    }
}

impl UploadConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_url: std::env::var("YOUTUBE_UPLOAD_URL").unwrap_or(defaults.upload_url),
            token_url: std::env::var("OAUTH_TOKEN_URL").unwrap_or(defaults.token_url),
            client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            chunk_size: std::env::var("UPLOAD_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(normalize_chunk_size)
                .unwrap_or(defaults.chunk_size),
            timeout: std::env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }

    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = normalize_chunk_size(bytes);
        self
    }
}

/// Round down to a multiple of [`CHUNK_GRANULARITY`], never below one unit.
pub fn normalize_chunk_size(bytes: usize) -> usize {
    (bytes / CHUNK_GRANULARITY).max(1) * CHUNK_GRANULARITY
}
