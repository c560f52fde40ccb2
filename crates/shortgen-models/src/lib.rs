//! Shared data models for the ShortGen upload core.
//!
//! This crate provides Serde-serializable types for:
//! - Segment analysis scores and generated short metadata
//! - Upload records (shorts) and their status lifecycle
//! - Jobs grouping shorts, with derived progress
//! - Stored OAuth credentials for the hosting account
//!
//! It also holds the pure length-contract helpers (title, tags,
//! description) so they can be tested without any service attached.

pub mod analysis;
pub mod credential;
pub mod error;
pub mod job;
pub mod metadata;
pub mod short;
pub mod text;

// Re-export common types
pub use analysis::AnalysisResult;
pub use credential::OAuthCredential;
pub use error::{ModelError, ModelResult};
pub use job::{Job, JobId, JobProgress};
pub use metadata::{
    fit_tags_to_budget, normalize_description, truncate_title, MetadataResult,
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, MAX_TAGS, MAX_TITLE_CHARS, TAG_BUDGET_CHARS,
};
pub use short::{ShortId, UploadRecord, UploadStatus};
