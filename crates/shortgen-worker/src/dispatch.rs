//! Fire-and-forget submission of upload batches.

use std::sync::Arc;

use shortgen_models::JobId;
use shortgen_upload::BatchUploadManager;
use tracing::Instrument;

use crate::logging::JobLogger;

/// Starts one detached background task per submitted job.
///
/// The submitter gets nothing back; results live on the shorts in the
/// store and in the logs.
#[derive(Clone)]
pub struct UploadDispatcher {
    manager: Arc<BatchUploadManager>,
}

impl UploadDispatcher {
    pub fn new(manager: Arc<BatchUploadManager>) -> Self {
        Self { manager }
    }

    pub fn submit(&self, job_id: JobId, account: String) {
        let manager = Arc::clone(&self.manager);
        let logger = JobLogger::new(&job_id, "upload_batch");
        let span = logger.create_span();

        tokio::spawn(
            async move {
                logger.log_start(&format!("uploading pending shorts as {account}"));
                match manager.upload_pending(&job_id, &account).await {
                    Ok(report) => logger.log_batch(&report),
                    Err(e) => logger.log_error(&e.to_string()),
                }
            }
            .instrument(span),
        );
    }
}
