//! Upload records ("shorts") and their status lifecycle.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};
use crate::job::JobId;

/// Unique identifier for a short.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(pub String);

impl ShortId {
    /// Generate a new random short ID.
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

impl Default for ShortId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upload status of a short.
///
/// ```text
/// PENDING -> UPLOADING -> COMPLETED
///                      \-> FAILED -> (operator reset) -> PENDING
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    /// Created by the media pipeline, waiting for upload
    #[default]
    Pending,
    /// A transfer is in flight
    Uploading,
    /// The hosting service returned a video id
    Completed,
    /// Upload failed; see `upload_error`
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "PENDING",
            UploadStatus::Uploading => "UPLOADING",
            UploadStatus::Completed => "COMPLETED",
            UploadStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }

    /// Whether the upload path may move a record from `self` to `next`.
    ///
    /// `FAILED -> PENDING` is deliberately absent: it is an operator
    /// action, see [`UploadRecord::reset_for_retry`].
    pub fn can_transition_to(&self, next: UploadStatus) -> bool {
        matches!(
            (self, next),
            (UploadStatus::Pending, UploadStatus::Uploading)
                | (UploadStatus::Uploading, UploadStatus::Completed)
                | (UploadStatus::Uploading, UploadStatus::Failed)
        )
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(UploadStatus::Pending),
            "UPLOADING" => Ok(UploadStatus::Uploading),
            "COMPLETED" => Ok(UploadStatus::Completed),
            "FAILED" => Ok(UploadStatus::Failed),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// A generated short tracked through upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Unique short ID
    pub id: ShortId,

    /// Owning job
    pub job_id: JobId,

    /// Rendered video file produced by the media pipeline
    pub output_path: PathBuf,

    /// Thumbnail next to the video, if one was rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub upload_status: UploadStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_error: Option<String>,

    /// Remote video id once the hosting service accepted the upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_video_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Create a new pending short for a rendered file.
    pub fn new(job_id: JobId, output_path: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            id: ShortId::new(),
            job_id,
            output_path: output_path.into(),
            thumbnail_path: None,
            title: None,
            description: None,
            tags: Vec::new(),
            upload_status: UploadStatus::Pending,
            upload_error: None,
            youtube_video_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach generated metadata.
    pub fn with_metadata(mut self, metadata: crate::MetadataResult) -> Self {
        self.title = Some(metadata.title);
        self.description = Some(metadata.description);
        self.tags = metadata.tags;
        self
    }

    fn transition(&mut self, next: UploadStatus) -> ModelResult<()> {
        if !self.upload_status.can_transition_to(next) {
            return Err(ModelError::InvalidTransition {
                from: self.upload_status,
                to: next,
            });
        }
        self.upload_status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `PENDING -> UPLOADING`.
    pub fn begin_upload(&mut self) -> ModelResult<()> {
        self.transition(UploadStatus::Uploading)
    }

    /// `UPLOADING -> COMPLETED`, recording the remote id.
    pub fn complete(&mut self, video_id: impl Into<String>) -> ModelResult<()> {
        self.transition(UploadStatus::Completed)?;
        self.youtube_video_id = Some(video_id.into());
        self.upload_error = None;
        Ok(())
    }

    /// `UPLOADING -> FAILED`, recording the error text.
    pub fn fail(&mut self, error: impl Into<String>) -> ModelResult<()> {
        self.transition(UploadStatus::Failed)?;
        self.upload_error = Some(error.into());
        Ok(())
    }

    /// Operator retry: `FAILED -> PENDING`, clearing the error.
    pub fn reset_for_retry(&mut self) -> ModelResult<()> {
        if self.upload_status != UploadStatus::Failed {
            return Err(ModelError::InvalidTransition {
                from: self.upload_status,
                to: UploadStatus::Pending,
            });
        }
        self.upload_status = UploadStatus::Pending;
        self.upload_error = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Public watch URL, once uploaded.
    pub fn watch_url(&self) -> Option<String> {
        self.youtube_video_id
            .as_deref()
            .map(|id| format!("https://www.youtube.com/watch?v={id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UploadRecord {
        UploadRecord::new(JobId::from_string("job-1"), "/tmp/out.mp4")
    }

    #[test]
    fn test_happy_path() {
        let mut r = record();
        assert_eq!(r.upload_status, UploadStatus::Pending);
        r.begin_upload().unwrap();
        r.complete("abc123").unwrap();
        assert_eq!(r.upload_status, UploadStatus::Completed);
        assert_eq!(r.youtube_video_id.as_deref(), Some("abc123"));
        assert_eq!(
            r.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }

    #[test]
    fn test_failure_then_operator_reset() {
        let mut r = record();
        r.begin_upload().unwrap();
        r.fail("boom").unwrap();
        assert_eq!(r.upload_error.as_deref(), Some("boom"));

        // Never automatically back to pending or uploading.
        assert!(r.begin_upload().is_err());

        r.reset_for_retry().unwrap();
        assert_eq!(r.upload_status, UploadStatus::Pending);
        assert!(r.upload_error.is_none());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut r = record();
        assert!(r.complete("x").is_err());
        assert!(r.fail("x").is_err());
        assert!(r.reset_for_retry().is_err());

        r.begin_upload().unwrap();
        r.complete("x").unwrap();
        assert_eq!(
            r.fail("late"),
            Err(ModelError::InvalidTransition {
                from: UploadStatus::Completed,
                to: UploadStatus::Failed,
            })
        );
        assert!(r.reset_for_retry().is_err());
    }

    #[test]
    fn test_status_serde_and_parse() {
        assert_eq!(
            serde_json::to_string(&UploadStatus::Uploading).unwrap(),
            "\"UPLOADING\""
        );
        assert_eq!("failed".parse::<UploadStatus>().unwrap(), UploadStatus::Failed);
        assert!("bogus".parse::<UploadStatus>().is_err());
        assert!(UploadStatus::Completed.is_terminal());
        assert!(!UploadStatus::Uploading.is_terminal());
    }
}
