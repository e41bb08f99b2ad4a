//! Generation metrics.
//!
//! - Submit retries by operation
//! - Generation outcomes and latency
//! - Circuit breaker openings by provider key

use std::time::Duration;

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Retried submit attempts.
    pub const SUBMIT_RETRIES_TOTAL: &str = "vgen_submit_retries_total";

    /// Completed generations by outcome reason.
    pub const GENERATION_TOTAL: &str = "vgen_generation_total";

    /// Wall time from submit to terminal status.
    pub const GENERATION_SECONDS: &str = "vgen_generation_seconds";

    /// Circuit breaker transitions to open.
    pub const BREAKER_OPEN_TOTAL: &str = "vgen_breaker_open_total";
}

pub fn record_retry(operation: &str) {
    counter!(
        names::SUBMIT_RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a finished generation. `outcome` is `ok` or an error reason code.
pub fn record_generation(provider: &str, outcome: &str, elapsed: Duration) {
    counter!(
        names::GENERATION_TOTAL,
        "provider" => provider.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        names::GENERATION_SECONDS,
        "provider" => provider.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_breaker_open(key: &str) {
    counter!(
        names::BREAKER_OPEN_TOTAL,
        "breaker" => key.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::SUBMIT_RETRIES_TOTAL.starts_with("vgen_"));
        assert!(names::GENERATION_SECONDS.ends_with("_seconds"));
    }
}
