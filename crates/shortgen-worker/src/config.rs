//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// JSON snapshot backing the job store; in-memory only when unset
    pub state_file: Option<PathBuf>,
    /// Work directory for temporary files
    pub temp_dir: PathBuf,
    /// Age after which a temporary file is swept
    pub temp_max_age: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            temp_dir: PathBuf::from("temp"),
            temp_max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            state_file: std::env::var("SHORTGEN_STATE_FILE")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            temp_dir: std::env::var("SHORTGEN_TEMP_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.temp_dir),
            temp_max_age: std::env::var("TEMP_MAX_AGE_HOURS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|hours| Duration::from_secs(hours * 60 * 60))
                .unwrap_or(defaults.temp_max_age),
        }
    }
}
