//! Persistence seams for jobs, shorts and OAuth credentials.
//!
//! The upload core only reads and updates records; schema and migrations
//! belong to whatever backs these traits. [`InMemoryStore`] is the bundled
//! implementation, optionally mirrored to a JSON snapshot on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shortgen_models::{Job, JobId, OAuthCredential, ShortId, UploadRecord};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Read/update access to jobs and their shorts.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>>;

    async fn get_short(&self, id: &ShortId) -> StoreResult<Option<UploadRecord>>;

    /// All shorts of a job, in creation order.
    async fn shorts_for_job(&self, job_id: &JobId) -> StoreResult<Vec<UploadRecord>>;

    /// Persist a short. Returns only once the write is visible to readers.
    async fn save_short(&self, record: &UploadRecord) -> StoreResult<()>;

    /// Atomically move a `PENDING` short to `UPLOADING` and return it.
    ///
    /// Of several concurrent callers at most one succeeds. The others get
    /// `StoreError::Model(InvalidTransition)` carrying the current status,
    /// and an unknown id is `StoreError::NotFound`.
    async fn claim_for_upload(&self, id: &ShortId) -> StoreResult<UploadRecord>;
}

/// Stored OAuth tokens per hosting account.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_credential(&self, account: &str) -> StoreResult<Option<OAuthCredential>>;

    async fn save_credential(&self, account: &str, credential: &OAuthCredential)
        -> StoreResult<()>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    jobs: HashMap<JobId, Job>,
    /// Kept in insertion order so batches run in creation order.
    #[serde(default)]
    shorts: Vec<UploadRecord>,
    #[serde(default)]
    credentials: HashMap<String, OAuthCredential>,
}

/// In-process store guarded by a `RwLock`.
///
/// With a snapshot path, every write rewrites the snapshot before the lock
/// is released, so a write that returned is also on disk.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    snapshot: Option<PathBuf>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading it if it exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let state: StoreState = serde_json::from_slice(&bytes)?;
                info!(
                    path = %path.display(),
                    jobs = state.jobs.len(),
                    shorts = state.shorts.len(),
                    "Loaded store snapshot"
                );
                state
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            state: RwLock::new(state),
            snapshot: Some(path),
        })
    }

    pub async fn insert_job(&self, job: Job) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.jobs.insert(job.id.clone(), job);
        self.persist(&state).await
    }

    pub async fn insert_short(&self, record: UploadRecord) -> StoreResult<()> {
        let mut state = self.state.write().await;
        upsert_short(&mut state.shorts, record);
        self.persist(&state).await
    }

    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        write_snapshot(path, state).await?;
        debug!(path = %path.display(), "Store snapshot written");
        Ok(())
    }
}

fn upsert_short(shorts: &mut Vec<UploadRecord>, record: UploadRecord) {
    match shorts.iter_mut().find(|s| s.id == record.id) {
        Some(existing) => *existing = record,
        None => shorts.push(record),
    }
}

/// Write to a sibling temp file and rename over the snapshot.
async fn write_snapshot(path: &Path, state: &StoreState) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.state.read().await.jobs.get(id).cloned())
    }

    async fn get_short(&self, id: &ShortId) -> StoreResult<Option<UploadRecord>> {
        let state = self.state.read().await;
        Ok(state.shorts.iter().find(|s| &s.id == id).cloned())
    }

    async fn shorts_for_job(&self, job_id: &JobId) -> StoreResult<Vec<UploadRecord>> {
        let state = self.state.read().await;
        Ok(state
            .shorts
            .iter()
            .filter(|s| &s.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn save_short(&self, record: &UploadRecord) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.shorts.iter().any(|s| s.id == record.id) {
            return Err(StoreError::not_found(format!("short {}", record.id)));
        }
        upsert_short(&mut state.shorts, record.clone());
        self.persist(&state).await
    }

    async fn claim_for_upload(&self, id: &ShortId) -> StoreResult<UploadRecord> {
        let mut state = self.state.write().await;
        let record = state
            .shorts
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| StoreError::not_found(format!("short {id}")))?;
        record.begin_upload()?;
        let claimed = record.clone();
        self.persist(&state).await?;
        Ok(claimed)
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn get_credential(&self, account: &str) -> StoreResult<Option<OAuthCredential>> {
        Ok(self.state.read().await.credentials.get(account).cloned())
    }

    async fn save_credential(
        &self,
        account: &str,
        credential: &OAuthCredential,
    ) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state
            .credentials
            .insert(account.to_string(), credential.clone());
        self.persist(&state).await
    }
}
