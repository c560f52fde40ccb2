//! Job-level upload of pending shorts.

use std::sync::Arc;

use serde::Serialize;
use shortgen_models::{JobId, JobProgress, ShortId, UploadRecord, UploadStatus};
use tracing::{info, warn};

use crate::coordinator::{UploadCoordinator, UploadOutcome};
use crate::error::{StoreError, UploadResult};
use crate::store::JobStore;
use crate::sweep::TempSweeper;

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub job_id: JobId,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Short id and persisted error text for each failure.
    pub failures: Vec<(ShortId, String)>,
}

impl BatchReport {
    fn empty(job_id: JobId) -> Self {
        Self {
            job_id,
            ..Default::default()
        }
    }

    /// Every attempted short reached `COMPLETED` (true for an empty batch).
    pub fn is_success(&self) -> bool {
        self.succeeded == self.attempted
    }
}

/// Uploads the pending shorts of a job, one after another.
pub struct BatchUploadManager {
    store: Arc<dyn JobStore>,
    coordinator: UploadCoordinator,
    sweeper: Option<TempSweeper>,
}

impl BatchUploadManager {
    pub fn new(store: Arc<dyn JobStore>, coordinator: UploadCoordinator) -> Self {
        Self {
            store,
            coordinator,
            sweeper: None,
        }
    }

    /// Sweep the temporary directory after every batch.
    pub fn with_sweeper(mut self, sweeper: TempSweeper) -> Self {
        self.sweeper = Some(sweeper);
        self
    }

    /// Upload every `PENDING` short of `job_id` sequentially.
    ///
    /// Per-short failures are recorded on the short and counted in the
    /// report. Only a missing job or an unreadable store is an error.
    pub async fn upload_pending(&self, job_id: &JobId, account: &str) -> UploadResult<BatchReport> {
        if self.store.get_job(job_id).await?.is_none() {
            return Err(StoreError::not_found(format!("job {job_id}")).into());
        }

        let pending: Vec<UploadRecord> = self
            .store
            .shorts_for_job(job_id)
            .await?
            .into_iter()
            .filter(|s| s.upload_status == UploadStatus::Pending)
            .collect();

        let mut report = BatchReport::empty(job_id.clone());
        if pending.is_empty() {
            info!(job_id = %job_id, "No pending shorts to upload");
            self.sweep().await;
            return Ok(report);
        }

        info!(job_id = %job_id, count = pending.len(), "Uploading pending shorts");

        for short in pending {
            match self.coordinator.upload(&short.id, account).await {
                UploadOutcome::Completed { .. } => {
                    report.attempted += 1;
                    report.succeeded += 1;
                }
                UploadOutcome::Failed { error, .. } => {
                    report.attempted += 1;
                    report.failed += 1;
                    report.failures.push((short.id, error));
                }
                // Picked up by someone else or removed since the scan.
                UploadOutcome::Skipped { status } => {
                    warn!(short_id = %short.id, status = %status, "Short changed state, skipped");
                }
                UploadOutcome::NotFound => {
                    warn!(short_id = %short.id, "Short disappeared before upload");
                }
            }
        }

        info!(
            job_id = %job_id,
            succeeded = report.succeeded,
            failed = report.failed,
            "Batch upload finished"
        );

        self.sweep().await;
        Ok(report)
    }

    /// Operator retry: move a `FAILED` short back to `PENDING`.
    pub async fn reset_failed(&self, short_id: &ShortId) -> UploadResult<UploadRecord> {
        let mut record = self
            .store
            .get_short(short_id)
            .await?
            .ok_or_else(|| StoreError::not_found(format!("short {short_id}")))?;

        record.reset_for_retry().map_err(StoreError::from)?;
        self.store.save_short(&record).await?;
        info!(short_id = %short_id, job_id = %record.job_id, "Short reset for retry");
        Ok(record)
    }

    /// Per-status counts for a job.
    pub async fn progress(&self, job_id: &JobId) -> UploadResult<JobProgress> {
        let shorts = self.store.shorts_for_job(job_id).await?;
        Ok(JobProgress::from_records(&shorts))
    }

    async fn sweep(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.sweep().await;
        }
    }
}
