//! Upload of generated shorts to YouTube.
//!
//! This crate provides:
//! - Storage traits for jobs, shorts and OAuth credentials, plus an
//!   in-memory implementation with an optional JSON snapshot
//! - OAuth token refresh against the identity provider
//! - A resumable, chunked YouTube upload client
//! - `UploadCoordinator`: drives one short through its status lifecycle
//! - `BatchUploadManager`: uploads a job's pending shorts one by one
//! - A sweep of stale files in the temporary directory

pub mod batch;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod oauth;
pub mod store;
pub mod sweep;
pub mod youtube;

pub use batch::{BatchReport, BatchUploadManager};
pub use config::UploadConfig;
pub use coordinator::{UploadCoordinator, UploadOutcome};
pub use error::{StoreError, StoreResult, UploadError, UploadResult};
pub use oauth::{CredentialResolver, GoogleIdentityProvider, IdentityProvider, RefreshedToken};
pub use store::{CredentialStore, InMemoryStore, JobStore};
pub use sweep::TempSweeper;
pub use youtube::{ProgressCallback, VideoHost, VideoUpload, YouTubeClient};
