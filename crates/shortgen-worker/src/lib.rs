//! ShortGen worker.
//!
//! This crate provides:
//! - Environment configuration for the worker
//! - Structured job logging
//! - Preparation of pending shorts from scored segments
//! - A detached dispatcher for upload batches

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod prepare;

pub use config::WorkerConfig;
pub use dispatch::UploadDispatcher;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use prepare::ShortPreparer;
