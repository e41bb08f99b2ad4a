//! Structured generation logging.

use tracing::{error, info, warn, Span};
use vgen_models::JobId;

/// Logger carrying job id, provider and operation on every line.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    provider: String,
    operation: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId, provider: &str, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            provider: provider.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            provider = %self.provider,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            provider = %self.provider,
            operation = %self.operation,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            provider = %self.provider,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            provider = %self.provider,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            provider = %self.provider,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Span for instrumenting the whole generation future.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            provider = %self.provider,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::from_string("job-1");
        let logger = JobLogger::new(&job_id, "openai", "generate");
        assert_eq!(logger.job_id(), "job-1");
        assert_eq!(logger.provider(), "openai");
    }
}
