//! Worker error types.

use shortgen_ai::AiError;
use shortgen_upload::{StoreError, UploadError};
use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors raised while wiring up or driving the worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Analysis service setup failed: {0}")]
    Ai(#[from] AiError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
