//! Analysis service configuration.

use std::time::Duration;

use crate::retry::BackoffPolicy;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for both analysis and metadata.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Configuration shared by the analysis engine and metadata synthesizer.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Model identifier, e.g. `gemini-2.5-pro`
    pub model: String,
    /// Base URL of the REST API (overridable for tests)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy for segment analysis
    pub analysis_retry: BackoffPolicy,
    /// Retry policy for metadata generation
    pub metadata_retry: BackoffPolicy,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            analysis_retry: BackoffPolicy::analysis(),
            metadata_retry: BackoffPolicy::metadata(),
        }
    }
}

impl AiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("GEMINI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }

    /// Point the client at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Drop every retry delay. Used by tests.
    pub fn without_delays(mut self) -> Self {
        self.analysis_retry = self.analysis_retry.without_delay();
        self.metadata_retry = self.metadata_retry.without_delay();
        self
    }
}
