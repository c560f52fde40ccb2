//! Model error types.

use thiserror::Error;

use crate::short::UploadStatus;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by model invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid upload status transition: {from} -> {to}")]
    InvalidTransition {
        from: UploadStatus,
        to: UploadStatus,
    },

    #[error("Unknown upload status: {0}")]
    UnknownStatus(String),
}
