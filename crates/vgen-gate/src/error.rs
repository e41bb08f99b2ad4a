//! Gate error types.

use std::time::Duration;
use thiserror::Error;

pub type GateResult<T> = Result<T, GateError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Rate limit exceeded, retry in {}s", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error("Concurrency gate closed")]
    Closed,
}

impl GateError {
    /// Machine-readable reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            GateError::RateLimited { .. } => "rate_limited",
            GateError::Closed => "concurrency_rejected",
        }
    }

    /// Short message suitable for the requesting user.
    pub fn user_message(&self) -> String {
        match self {
            GateError::RateLimited { retry_after } => format!(
                "Too many requests, please try again in {} seconds",
                retry_after.as_secs().max(1)
            ),
            GateError::Closed => "Service is shutting down, request rejected".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let limited = GateError::RateLimited {
            retry_after: Duration::from_millis(300),
        };
        assert_eq!(limited.reason_code(), "rate_limited");
        assert!(limited.user_message().contains("1 seconds"));
        assert_eq!(GateError::Closed.reason_code(), "concurrency_rejected");
    }
}
