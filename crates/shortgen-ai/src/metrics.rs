//! Analysis service metrics.
//!
//! Counters only; without an installed recorder they are no-ops.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Service requests by operation and outcome.
    pub const REQUESTS_TOTAL: &str = "shortgen_ai_requests_total";

    /// Results produced by the local fallback, by operation.
    pub const FALLBACKS_TOTAL: &str = "shortgen_ai_fallbacks_total";

    /// API key rotations; `exhausted` is true for the final one.
    pub const KEY_ROTATIONS_TOTAL: &str = "shortgen_ai_key_rotations_total";
}

/// Record a finished service request.
pub fn record_request(operation: &'static str, success: bool) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation,
        "outcome" => if success { "success" } else { "error" }
    )
    .increment(1);
}

/// Record a result served by the local fallback.
pub fn record_fallback(operation: &'static str) {
    counter!(names::FALLBACKS_TOTAL, "operation" => operation).increment(1);
}

/// Record a key rotation.
pub fn record_key_rotation(exhausted: bool) {
    counter!(
        names::KEY_ROTATIONS_TOTAL,
        "exhausted" => if exhausted { "true" } else { "false" }
    )
    .increment(1);
}
