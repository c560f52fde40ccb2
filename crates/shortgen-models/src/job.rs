//! Jobs group the shorts cut from one source video.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::short::{UploadRecord, UploadStatus};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A processing job. It has no status of its own; see [`JobProgress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// Source video URL
    pub youtube_url: String,

    /// Title of the source video, used when generating metadata
    #[serde(default)]
    pub original_title: String,

    /// Language the metadata should be written in
    #[serde(default = "default_language")]
    pub content_language: String,

    pub created_at: DateTime<Utc>,
}

fn default_language() -> String {
    "English".to_string()
}

impl Job {
    pub fn new(youtube_url: impl Into<String>, original_title: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            youtube_url: youtube_url.into(),
            original_title: original_title.into(),
            content_language: default_language(),
            created_at: Utc::now(),
        }
    }
}

/// Upload progress of a job, derived by scanning its shorts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub pending: usize,
    pub uploading: usize,
    pub completed: usize,
    pub failed: usize,
}

impl JobProgress {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a UploadRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut progress, record| {
                match record.upload_status {
                    UploadStatus::Pending => progress.pending += 1,
                    UploadStatus::Uploading => progress.uploading += 1,
                    UploadStatus::Completed => progress.completed += 1,
                    UploadStatus::Failed => progress.failed += 1,
                }
                progress
            })
    }

    pub fn total(&self) -> usize {
        self.pending + self.uploading + self.completed + self.failed
    }

    /// No short is waiting or in flight.
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.uploading == 0
    }

    /// Every short reached `COMPLETED` (vacuously true for an empty job).
    pub fn all_uploaded(&self) -> bool {
        self.completed == self.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_from_records() {
        let job = JobId::from_string("job-1");
        let mut records: Vec<UploadRecord> = (0..4)
            .map(|i| UploadRecord::new(job.clone(), format!("/out/{i}.mp4")))
            .collect();

        records[0].begin_upload().unwrap();
        records[1].begin_upload().unwrap();
        records[1].complete("v1").unwrap();
        records[2].begin_upload().unwrap();
        records[2].fail("nope").unwrap();

        let progress = JobProgress::from_records(&records);
        assert_eq!(
            progress,
            JobProgress {
                pending: 1,
                uploading: 1,
                completed: 1,
                failed: 1
            }
        );
        assert_eq!(progress.total(), 4);
        assert!(!progress.is_complete());
        assert!(!progress.all_uploaded());
    }

    #[test]
    fn test_empty_job_is_complete() {
        let progress = JobProgress::from_records(&[]);
        assert!(progress.is_complete());
        assert!(progress.all_uploaded());
    }
}
