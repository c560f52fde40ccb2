//! Structured job logging utilities.
//!
//! Keeps the `job_id` and `operation` fields consistent across every
//! lifecycle event a worker logs for a job.

use shortgen_models::JobId;
use shortgen_upload::BatchReport;
use tracing::{error, info, warn, Span};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Log targets raised to `info` by default, one per workspace crate.
pub const LOG_TARGETS: &[&str] = &["shortgen_ai", "shortgen_upload", "shortgen_worker"];

/// `RUST_LOG` filter with the workspace crates at `info` and HTTP internals
/// at `warn`.
pub fn env_filter() -> Result<EnvFilter, ParseError> {
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{target}=info").parse()?);
    }
    Ok(filter.add_directive("hyper=warn".parse()?))
}

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
}

impl JobLogger {
    /// `operation` names the kind of work, e.g. "upload_batch".
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    /// Log the outcome of a batch, one warning per failed short.
    pub fn log_batch(&self, report: &BatchReport) {
        for (short_id, error) in &report.failures {
            self.log_warning(&format!("short {short_id} failed: {error}"));
        }
        let summary = format!(
            "{}/{} shorts uploaded",
            report.succeeded, report.attempted
        );
        if report.is_success() {
            info!(
                job_id = %self.job_id,
                operation = %self.operation,
                "Job completed: {}", summary
            );
        } else {
            self.log_error(&summary);
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span carrying the job fields, for instrumenting a whole task.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_names_real_crate_targets() {
        let own_crate = module_path!().split("::").next().unwrap();
        assert!(LOG_TARGETS.contains(&own_crate));
        assert!(LOG_TARGETS.contains(&"shortgen_upload"));

        let filter = env_filter().unwrap().to_string();
        for target in LOG_TARGETS {
            assert!(filter.contains(&format!("{target}=info")), "{filter}");
        }
    }

    #[test]
    fn test_job_logger_fields() {
        let job_id = JobId::from_string("job-123");
        let logger = JobLogger::new(&job_id, "upload_batch");

        assert_eq!(logger.job_id(), "job-123");
        assert_eq!(logger.operation(), "upload_batch");
    }

    #[test]
    fn test_log_batch_accepts_partial_failure() {
        let logger = JobLogger::new(&JobId::from_string("job-1"), "upload_batch");
        let report = BatchReport {
            job_id: JobId::from_string("job-1"),
            attempted: 2,
            succeeded: 1,
            failed: 1,
            failures: vec![(
                shortgen_models::ShortId::from_string("s-2"),
                "[media_not_found] Video file not found: /x.mp4".to_string(),
            )],
        };
        logger.log_batch(&report);
        assert!(!report.is_success());
    }
}
