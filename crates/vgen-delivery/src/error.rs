//! Delivery error types.

use thiserror::Error;

use crate::classify::DeliveryReason;

pub type DeliveryResult<T> = Result<T, DeliveryError>;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Rejected by risk control: {0}")]
    RiskControl(String),

    #[error("Video payload rejected: {0}")]
    FileError(String),

    #[error("Transport out of disk space: {0}")]
    NoSpace(String),

    #[error("Transport returned HTTP {status}: {body}")]
    TransportStatus { status: u16, body: String },

    #[error("Delivery failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Video download failed: {0}")]
    DownloadFailed(String),

    #[error("Video is {size_mb:.1} MB, over the {limit_mb} MB inline limit")]
    TooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeliveryError {
    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    /// Build the fatal error for a classified transport reply.
    pub(crate) fn from_reason(reason: DeliveryReason, message: &str) -> Option<Self> {
        let message = message.to_string();
        match reason {
            DeliveryReason::RiskControl => Some(Self::RiskControl(message)),
            DeliveryReason::FileError => Some(Self::FileError(message)),
            DeliveryReason::NoSpace => Some(Self::NoSpace(message)),
            DeliveryReason::Ok | DeliveryReason::Retryable => None,
        }
    }

    /// Machine-readable reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            DeliveryError::RiskControl(_) => "risk_control",
            DeliveryError::FileError(_) => "file_error",
            DeliveryError::NoSpace(_) => "no_space",
            DeliveryError::TransportStatus { .. } => "transport_status",
            DeliveryError::RetriesExhausted { .. } => "retries_exhausted",
            DeliveryError::DownloadFailed(_) | DeliveryError::TooLarge { .. } => "download_failed",
            DeliveryError::Config(_) => "internal",
        }
    }

    /// Whether sending the same video inline might still work.
    pub fn allows_inline_fallback(&self) -> bool {
        !matches!(self, DeliveryError::RiskControl(_) | DeliveryError::NoSpace(_))
    }

    /// Short message suitable for the requesting user.
    pub fn user_message(&self) -> String {
        match self {
            DeliveryError::RiskControl(_) => "Blocked by platform risk control".to_string(),
            DeliveryError::FileError(_) => "The video file was rejected".to_string(),
            DeliveryError::NoSpace(_) => "The chat transport is out of disk space".to_string(),
            DeliveryError::TransportStatus { status, .. } => {
                format!("Local transport error (HTTP {})", status)
            }
            DeliveryError::RetriesExhausted { .. } => "Sending failed after several retries".to_string(),
            DeliveryError::DownloadFailed(reason) => format!("Video download failed: {}", reason),
            DeliveryError::TooLarge { size_mb, limit_mb } => {
                format!("Video is too large to send ({:.1} MB > {} MB)", size_mb, limit_mb)
            }
            DeliveryError::Config(_) => "Delivery is misconfigured".to_string(),
        }
    }
}
