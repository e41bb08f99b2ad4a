//! Generation error types.

use std::time::Duration;

use thiserror::Error;
use vgen_providers::ProviderError;

pub type GenerationResult<T> = Result<T, GenerationError>;

/// HTTP statuses worth retrying on submit.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Everything that can end a generation without a video.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider reported failure: {0}")]
    ProviderFailure(String),

    #[error("Circuit open for {key}")]
    CircuitOpen { key: String },

    #[error("Concurrency gate rejected the request")]
    ConcurrencyRejected,

    #[error("Rate limited, retry in {}s", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error("Poll timeout after {}s", elapsed.as_secs())]
    PollTimeout { elapsed: Duration },

    #[error("Poll attempts exhausted after {attempts}")]
    PollExhausted { attempts: u32 },

    #[error("Unsupported provider format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a submit attempt failing with this error may be repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Network(_) => true,
            GenerationError::HttpStatus { status, .. } => RETRYABLE_STATUSES.contains(status),
            _ => false,
        }
    }

    /// Machine-readable reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            GenerationError::Network(_) => "network_error",
            GenerationError::HttpStatus { .. } => "http_status",
            GenerationError::MalformedResponse(_) => "malformed_response",
            GenerationError::ProviderFailure(_) => "provider_failure",
            GenerationError::CircuitOpen { .. } => "circuit_open",
            GenerationError::ConcurrencyRejected => "concurrency_rejected",
            GenerationError::RateLimited { .. } => "rate_limited",
            GenerationError::PollTimeout { .. } => "poll_timeout",
            GenerationError::PollExhausted { .. } => "poll_exhausted",
            GenerationError::UnsupportedFormat(_) => "unsupported_format",
            GenerationError::InvalidRequest(_) => "invalid_request",
            GenerationError::Internal(_) => "internal",
        }
    }

    /// Short message suitable for the requesting user.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::CircuitOpen { .. } => {
                "Video service is temporarily unavailable, please try again later".to_string()
            }
            GenerationError::ConcurrencyRejected => {
                "Service is shutting down, request rejected".to_string()
            }
            GenerationError::RateLimited { retry_after } => format!(
                "Too many requests, please try again in {} seconds",
                retry_after.as_secs().max(1)
            ),
            GenerationError::PollTimeout { .. } => "Video generation timed out".to_string(),
            GenerationError::PollExhausted { .. } => {
                "Video generation did not finish in time".to_string()
            }
            GenerationError::Internal(_) => "Video generation hit an internal error".to_string(),
            other => format!("Video generation failed: {}", other),
        }
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MalformedResponse(msg) => GenerationError::MalformedResponse(msg),
            ProviderError::InvalidProfile(msg) => GenerationError::InvalidRequest(msg),
            ProviderError::UnsupportedFormat(format) => GenerationError::UnsupportedFormat(format),
            ProviderError::Json(e) => GenerationError::MalformedResponse(e.to_string()),
        }
    }
}
