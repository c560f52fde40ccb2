//! Turns a selected segment into a pending short.
//!
//! Scoring and metadata never fail from the caller's point of view: both
//! engines fall back to local generation when the service is unusable.

use std::path::PathBuf;
use std::sync::Arc;

use shortgen_ai::{AiConfig, AnalysisEngine, CredentialPool, MetadataSynthesizer};
use shortgen_models::{AnalysisResult, Job, UploadRecord};
use shortgen_upload::InMemoryStore;
use tracing::info;

use crate::error::WorkerResult;

/// Segment scoring plus metadata for the shorts of a job.
pub struct ShortPreparer {
    analysis: AnalysisEngine,
    metadata: MetadataSynthesizer,
    store: Arc<InMemoryStore>,
}

impl ShortPreparer {
    /// Both engines share `pool`, so a key exhausted by one is skipped by
    /// the other.
    pub fn new(
        config: &AiConfig,
        pool: Arc<CredentialPool>,
        store: Arc<InMemoryStore>,
    ) -> WorkerResult<Self> {
        Ok(Self {
            analysis: AnalysisEngine::new(config, Arc::clone(&pool))?,
            metadata: MetadataSynthesizer::new(config, pool)?,
            store,
        })
    }

    pub async fn score(&self, segment_text: &str) -> AnalysisResult {
        self.analysis.score(segment_text).await
    }

    /// Generate metadata for a rendered segment and store it as a pending
    /// short of `job`.
    pub async fn prepare(
        &self,
        job: &Job,
        segment_text: &str,
        output_path: impl Into<PathBuf>,
    ) -> WorkerResult<UploadRecord> {
        let metadata = self
            .metadata
            .generate(segment_text, &job.original_title, &job.content_language)
            .await;

        let record = UploadRecord::new(job.id.clone(), output_path).with_metadata(metadata);
        self.store.insert_short(record.clone()).await?;
        info!(
            job_id = %job.id,
            short_id = %record.id,
            tags = record.tags.len(),
            "Short prepared for upload"
        );
        Ok(record)
    }
}
