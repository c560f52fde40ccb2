//! Segment analysis and metadata generation.
//!
//! This crate provides:
//! - A credential pool that rotates Gemini API keys on quota exhaustion
//! - A backoff policy and retry wrapper for service calls
//! - A minimal Gemini REST client with structured (schema-bound) output
//! - `AnalysisEngine`: engagement/virality scoring of a segment
//! - `MetadataSynthesizer`: title, description and tags for a short
//!
//! Both engines fall back to deterministic local generation whenever the
//! service is unusable; callers never see a service error.

pub mod analysis;
pub mod client;
pub mod config;
pub mod credentials;
pub mod description;
pub mod error;
pub mod lexicon;
pub mod metadata;
pub mod metrics;
pub mod retry;

pub use analysis::{fallback_analysis, AnalysisEngine};
pub use client::GeminiClient;
pub use config::AiConfig;
pub use credentials::{ApiKey, CredentialPool};
pub use description::{compose_long_description, Theme};
pub use error::{AiError, AiResult};
pub use metadata::{fallback_metadata, MetadataSynthesizer};
pub use retry::{retry_async, BackoffPolicy};
