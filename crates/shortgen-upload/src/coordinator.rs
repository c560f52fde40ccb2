//! Drives a single short through its upload lifecycle.

use std::sync::Arc;

use shortgen_models::{normalize_description, ModelError, ShortId, UploadRecord, UploadStatus};
use tracing::{error, info, info_span, warn, Instrument};

use crate::error::{StoreError, StoreResult, UploadError, UploadResult};
use crate::metrics::record_upload;
use crate::oauth::CredentialResolver;
use crate::store::JobStore;
use crate::youtube::{ProgressCallback, VideoHost, VideoUpload};

const DEFAULT_TAGS: [&str; 2] = ["shorts", "viral"];
const DEFAULT_DESCRIPTION: &str = "Generated YouTube Short";

/// How a single upload ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The short is `COMPLETED` with this remote id.
    Completed { video_id: String },
    /// The short is `FAILED`; `error` is what was stored on the record.
    Failed { kind: &'static str, error: String },
    /// The short is not in an uploadable state and was left untouched.
    Skipped { status: UploadStatus },
    /// No such short.
    NotFound,
}

impl UploadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, UploadOutcome::Completed { .. })
    }
}

/// Uploads one short at a time, recording every transition in the store.
pub struct UploadCoordinator {
    store: Arc<dyn JobStore>,
    credentials: CredentialResolver,
    host: Arc<dyn VideoHost>,
    progress: Option<ProgressCallback>,
}

impl UploadCoordinator {
    pub fn new(
        store: Arc<dyn JobStore>,
        credentials: CredentialResolver,
        host: Arc<dyn VideoHost>,
    ) -> Self {
        Self {
            store,
            credentials,
            host,
            progress: None,
        }
    }

    /// Report transfer progress (0.0 to 1.0) of every upload to `callback`.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Upload a short on behalf of `account`.
    ///
    /// Never returns an error: the result is persisted on the record and
    /// mirrored in the returned outcome. Local media files are kept
    /// whatever the outcome.
    pub async fn upload(&self, short_id: &ShortId, account: &str) -> UploadOutcome {
        let span = info_span!("upload_short", short_id = %short_id);
        self.upload_inner(short_id, account).instrument(span).await
    }

    async fn upload_inner(&self, short_id: &ShortId, account: &str) -> UploadOutcome {
        let record = match self.store.claim_for_upload(short_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => {
                error!("Short {} not found", short_id);
                return UploadOutcome::NotFound;
            }
            Err(StoreError::Model(ModelError::InvalidTransition { from, .. })) => {
                warn!(status = %from, "Short is not pending, skipping upload");
                return UploadOutcome::Skipped { status: from };
            }
            Err(e) => {
                error!("Failed to mark short {} as uploading: {}", short_id, e);
                return failed_outcome(&UploadError::Store(e));
            }
        };
        info!(job_id = %record.job_id, "Starting YouTube upload");

        match self.transfer(&record, account).await {
            Ok(video_id) => self.finish_completed(record, video_id).await,
            Err(e) => self.finish_failed(record, e).await,
        }
    }

    /// Credentials, media check, description contract, then the transfer.
    async fn transfer(&self, record: &UploadRecord, account: &str) -> UploadResult<String> {
        let credential = self.credentials.resolve(account).await?;

        if !tokio::fs::try_exists(&record.output_path).await.unwrap_or(false) {
            return Err(UploadError::MediaNotFound(record.output_path.clone()));
        }

        let description = normalize_description(
            record
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_DESCRIPTION),
        );
        info!(
            chars = description.chars().count(),
            "Video description normalized"
        );

        let video = VideoUpload {
            path: record.output_path.clone(),
            title: record
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("YouTube Short #{}", record.id)),
            description,
            tags: if record.tags.is_empty() {
                DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
            } else {
                record.tags.clone()
            },
        };

        self.host
            .upload_video(&credential.access_token, &video, self.progress.clone())
            .await
    }

    async fn finish_completed(&self, mut record: UploadRecord, video_id: String) -> UploadOutcome {
        if let Err(e) = record.complete(&video_id) {
            error!("Cannot complete short: {}", e);
            return failed_outcome(&UploadError::Store(e.into()));
        }
        if let Err(e) = self.save_with_retry(&record).await {
            // The video is live but the short still reads UPLOADING.
            error!(video_id = %video_id, "Failed to record completed upload: {}", e);
            let err = UploadError::Store(e);
            record_upload(UploadStatus::Failed.as_str(), err.kind());
            return failed_outcome(&err);
        }

        record_upload(UploadStatus::Completed.as_str(), "none");
        let url = record.watch_url().unwrap_or_default();
        info!(
            url = %url,
            output = %record.output_path.display(),
            "Upload completed, keeping local files"
        );
        UploadOutcome::Completed { video_id }
    }

    async fn finish_failed(&self, mut record: UploadRecord, err: UploadError) -> UploadOutcome {
        let text = err.to_record_text();
        error!(kind = err.kind(), "Upload failed: {}", err);

        if let Err(e) = record.fail(text.clone()) {
            error!("Cannot mark short as failed: {}", e);
        } else if let Err(e) = self.save_with_retry(&record).await {
            error!("Failed to record upload failure: {}", e);
        }

        record_upload(UploadStatus::Failed.as_str(), err.kind());
        UploadOutcome::Failed {
            kind: err.kind(),
            error: text,
        }
    }

    /// A terminal status must reach the store; one retry on error.
    async fn save_with_retry(&self, record: &UploadRecord) -> StoreResult<()> {
        match self.store.save_short(record).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Saving short failed, retrying once: {}", e);
                self.store.save_short(record).await
            }
        }
    }
}

fn failed_outcome(err: &UploadError) -> UploadOutcome {
    UploadOutcome::Failed {
        kind: err.kind(),
        error: err.to_record_text(),
    }
}
