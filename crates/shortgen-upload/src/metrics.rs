//! Upload metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Finished uploads by final status.
    pub const UPLOADS_TOTAL: &str = "shortgen_uploads_total";

    /// OAuth token refreshes by outcome.
    pub const TOKEN_REFRESHES_TOTAL: &str = "shortgen_token_refreshes_total";

    /// Temporary files removed by the sweep.
    pub const TEMP_FILES_REMOVED_TOTAL: &str = "shortgen_temp_files_removed_total";
}

/// Record a short reaching a terminal status.
pub fn record_upload(status: &'static str, kind: &'static str) {
    counter!(names::UPLOADS_TOTAL, "status" => status, "kind" => kind).increment(1);
}

pub fn record_token_refresh(success: bool) {
    counter!(
        names::TOKEN_REFRESHES_TOTAL,
        "outcome" => if success { "success" } else { "error" }
    )
    .increment(1);
}

pub fn record_temp_files_removed(count: u64) {
    counter!(names::TEMP_FILES_REMOVED_TOTAL).increment(count);
}
