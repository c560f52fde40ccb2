//! Removal of stale files from the temporary work directory.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use crate::metrics::record_temp_files_removed;

/// Default age after which a temporary file is considered abandoned.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Deletes regular files in one directory older than `max_age`.
///
/// Subdirectories are left alone. Rendered shorts live elsewhere and are
/// never touched by the sweep.
#[derive(Debug, Clone)]
pub struct TempSweeper {
    dir: PathBuf,
    max_age: Duration,
}

impl TempSweeper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Remove stale files and return how many were deleted.
    ///
    /// A missing directory is not an error. Failures on individual files
    /// are logged and skipped.
    pub async fn sweep(&self) -> usize {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Temp directory does not exist");
                return 0;
            }
            Err(e) => {
                warn!(dir = %self.dir.display(), "Failed to read temp directory: {}", e);
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read temp directory entry: {}", e);
                    break;
                }
            };
            let path = entry.path();

            match self.is_stale(&entry, now).await {
                Ok(true) => match tokio::fs::remove_file(&path).await {
                    Ok(()) => {
                        debug!(path = %path.display(), "Removed stale temp file");
                        removed += 1;
                    }
                    Err(e) => warn!(path = %path.display(), "Failed to remove temp file: {}", e),
                },
                Ok(false) => {}
                Err(e) => warn!(path = %path.display(), "Failed to stat temp file: {}", e),
            }
        }

        if removed > 0 {
            info!(dir = %self.dir.display(), removed, "Cleaned up old temp files");
            record_temp_files_removed(removed as u64);
        }
        removed
    }

    async fn is_stale(&self, entry: &tokio::fs::DirEntry, now: SystemTime) -> std::io::Result<bool> {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            return Ok(false);
        }
        // Modification times in the future count as fresh.
        let age = now
            .duration_since(metadata.modified()?)
            .unwrap_or(Duration::ZERO);
        Ok(age > self.max_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;

    fn age_file(path: &Path, age: Duration) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_only_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.mp4");
        let fresh = dir.path().join("fresh.mp4");
        let nested = dir.path().join("work");
        std::fs::write(&old, b"old").unwrap();
        std::fs::write(&fresh, b"fresh").unwrap();
        std::fs::create_dir(&nested).unwrap();
        age_file(&old, Duration::from_secs(25 * 60 * 60));

        let removed = TempSweeper::new(dir.path()).sweep().await;

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_sweep_honours_custom_age() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("segment.wav");
        std::fs::write(&file, b"x").unwrap();
        age_file(&file, Duration::from_secs(2 * 60 * 60));

        let sweeper = TempSweeper::new(dir.path()).with_max_age(Duration::from_secs(60 * 60));
        assert_eq!(sweeper.sweep().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sweeper = TempSweeper::new(dir.path().join("nope"));
        assert_eq!(sweeper.sweep().await, 0);
    }
}
