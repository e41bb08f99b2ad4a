//! Service error types.

use thiserror::Error;
use vgen_delivery::DeliveryError;
use vgen_gate::GateError;
use vgen_orchestrator::GenerationError;

use crate::config::ConfigError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The command was refused before any provider call
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Gate refusals surface as the matching generation failures.
impl From<GateError> for ServiceError {
    fn from(err: GateError) -> Self {
        ServiceError::Generation(match err {
            GateError::RateLimited { retry_after } => GenerationError::RateLimited { retry_after },
            GateError::Closed => GenerationError::ConcurrencyRejected,
        })
    }
}

impl ServiceError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            ServiceError::Config(_) => "config_error",
            ServiceError::Rejected(_) => "invalid_request",
            ServiceError::Generation(e) => e.reason_code(),
            ServiceError::Delivery(e) => e.reason_code(),
        }
    }

    /// Text shown to the caller.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Config(ConfigError::UnknownModel(id)) => {
                format!("Model '{}' is not configured", id)
            }
            ServiceError::Config(_) => "Video model configuration is invalid".to_string(),
            ServiceError::Rejected(msg) => msg.clone(),
            ServiceError::Generation(e) => e.user_message(),
            ServiceError::Delivery(e) => {
                format!("Video generated but sending failed: {}", e.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_reason_codes() {
        assert_eq!(ServiceError::rejected("empty").reason_code(), "invalid_request");
        assert_eq!(
            ServiceError::from(ConfigError::UnknownModel("m".into())).reason_code(),
            "config_error"
        );
        assert_eq!(
            ServiceError::from(GateError::RateLimited {
                retry_after: Duration::from_secs(3)
            })
            .reason_code(),
            "rate_limited"
        );
        assert_eq!(
            ServiceError::from(DeliveryError::RiskControl("x".into())).reason_code(),
            "risk_control"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ServiceError::from(ConfigError::UnknownModel("model9".into())).user_message(),
            "Model 'model9' is not configured"
        );
        assert_eq!(ServiceError::rejected("too long").user_message(), "too long");
        assert!(ServiceError::from(DeliveryError::RiskControl("x".into()))
            .user_message()
            .starts_with("Video generated but sending failed"));
    }

    #[test]
    fn test_from_gate_error() {
        let err = ServiceError::from(GateError::Closed);
        assert!(matches!(
            err,
            ServiceError::Generation(GenerationError::ConcurrencyRejected)
        ));
        assert_eq!(err.reason_code(), "concurrency_rejected");

        let err = ServiceError::from(GateError::RateLimited {
            retry_after: Duration::from_secs(30),
        });
        assert_eq!(err.reason_code(), "rate_limited");
        assert!(err.user_message().contains("30 seconds"));
    }
}
