//! Ordered pool of interchangeable Gemini API keys.
//!
//! Rotation is strictly forward: a key that hit its quota is never handed
//! out again, and once the last key is passed the pool stays exhausted for
//! the rest of the process.

use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use crate::metrics::record_key_rotation;

/// Environment variable holding the primary key.
pub const PRIMARY_KEY_VAR: &str = "GEMINI_API_KEY";

/// Number of numbered backup keys read from the environment
/// (`GEMINI_API_KEY_1` .. `GEMINI_API_KEY_4`).
pub const BACKUP_KEY_COUNT: usize = 4;

/// A key handed out by the pool, tagged with its position.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    index: usize,
    secret: String,
}

impl ApiKey {
    /// Position of this key in the pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw key material.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(#{})", self.index + 1)
    }
}

#[derive(Debug)]
struct PoolState {
    index: usize,
    exhausted: bool,
}

/// Shared, mutex-guarded key pool.
#[derive(Debug)]
pub struct CredentialPool {
    keys: Vec<String>,
    state: Mutex<PoolState>,
}

impl CredentialPool {
    /// Create a pool from keys in priority order. Empty keys are skipped;
    /// a pool with no keys starts out exhausted.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let exhausted = keys.is_empty();

        Self {
            keys,
            state: Mutex::new(PoolState {
                index: 0,
                exhausted,
            }),
        }
    }

    /// Read `GEMINI_API_KEY` followed by the numbered backup keys.
    pub fn from_env() -> Self {
        let mut keys = Vec::with_capacity(BACKUP_KEY_COUNT + 1);
        if let Ok(key) = std::env::var(PRIMARY_KEY_VAR) {
            keys.push(key);
        }
        for i in 1..=BACKUP_KEY_COUNT {
            if let Ok(key) = std::env::var(format!("{PRIMARY_KEY_VAR}_{i}")) {
                keys.push(key);
            }
        }

        let pool = Self::new(keys);
        if pool.is_empty() {
            warn!("No Gemini API keys configured, analysis will use local fallback only");
        } else {
            info!("Found {} Gemini API key(s)", pool.len());
        }
        pool
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // The state is two plain fields; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The active key, or `None` once the pool is exhausted.
    pub fn current(&self) -> Option<ApiKey> {
        let state = self.lock();
        if state.exhausted {
            return None;
        }
        self.keys.get(state.index).map(|secret| ApiKey {
            index: state.index,
            secret: secret.clone(),
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().exhausted
    }

    /// Move to the next key. Returns whether a key is available afterwards.
    pub fn advance(&self) -> bool {
        let mut state = self.lock();
        Self::advance_locked(&mut state, self.keys.len())
    }

    /// Rotate away from `failed`, unless another caller already did.
    ///
    /// Concurrent callers that failed on the same key rotate the pool only
    /// once, so a valid backup key is never skipped. Returns whether a key
    /// is available afterwards.
    pub fn advance_past(&self, failed: &ApiKey) -> bool {
        let mut state = self.lock();
        if state.exhausted {
            return false;
        }
        if state.index != failed.index {
            return true;
        }
        Self::advance_locked(&mut state, self.keys.len())
    }

    fn advance_locked(state: &mut PoolState, len: usize) -> bool {
        if state.exhausted {
            return false;
        }

        state.index += 1;
        if state.index < len {
            info!(key_index = state.index + 1, "Switching to backup Gemini API key");
            record_key_rotation(false);
            true
        } else {
            state.exhausted = true;
            warn!("All Gemini API keys exhausted, switching to fallback mode");
            record_key_rotation(true);
            false
        }
    }
}
