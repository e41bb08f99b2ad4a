//! Classification of chat transport replies.

use serde_json::Value;

/// Retcodes the transport uses for risk control rejections.
const RISK_CONTROL_RETCODES: [i64; 3] = [100, 120, 121];

/// Outcome of one delivery attempt as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryReason {
    Ok,
    /// Platform risk control; retrying makes it worse
    RiskControl,
    /// Payload rejected
    FileError,
    /// Transport host out of disk
    NoSpace,
    Retryable,
}

impl DeliveryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryReason::Ok => "ok",
            DeliveryReason::RiskControl => "risk_control",
            DeliveryReason::FileError => "file_error",
            DeliveryReason::NoSpace => "no_space",
            DeliveryReason::Retryable => "retryable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryReason::Retryable)
    }
}

/// Classify a transport reply body.
///
/// Checks run in order: `status == "ok"`, risk control by message or
/// retcode, file errors, disk space. Anything else is retryable.
pub fn classify_response(body: &Value) -> DeliveryReason {
    if body.get("status").and_then(Value::as_str) == Some("ok") {
        return DeliveryReason::Ok;
    }

    let message = response_message(body).to_lowercase();
    let retcode = body.get("retcode").and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
    });

    if message.contains("风控") || message.contains("risk") {
        return DeliveryReason::RiskControl;
    }
    if retcode.is_some_and(|code| RISK_CONTROL_RETCODES.contains(&code)) {
        return DeliveryReason::RiskControl;
    }
    if message.contains("file") || message.contains("video") {
        return DeliveryReason::FileError;
    }
    if message.contains("enospc") || message.contains("no space left on device") {
        return DeliveryReason::NoSpace;
    }

    DeliveryReason::Retryable
}

/// The reply's `message` text, or empty.
pub(crate) fn response_message(body: &Value) -> &str {
    body.get("message").and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok() {
        assert_eq!(
            classify_response(&json!({"status": "ok", "retcode": 0})),
            DeliveryReason::Ok
        );
    }

    #[test]
    fn test_risk_control() {
        assert_eq!(
            classify_response(&json!({"status": "failed", "retcode": 120, "message": "risk control"})),
            DeliveryReason::RiskControl
        );
        assert_eq!(
            classify_response(&json!({"status": "failed", "message": "消息被风控"})),
            DeliveryReason::RiskControl
        );
        assert_eq!(
            classify_response(&json!({"status": "failed", "retcode": "121", "message": "upload video failed"})),
            DeliveryReason::RiskControl
        );
    }

    #[test]
    fn test_file_error() {
        assert_eq!(
            classify_response(&json!({"status": "failed", "retcode": 1200, "message": "File not found"})),
            DeliveryReason::FileError
        );
    }

    #[test]
    fn test_no_space() {
        assert_eq!(
            classify_response(&json!({"status": "failed", "message": "ENOSPC: write failed"})),
            DeliveryReason::NoSpace
        );
        assert_eq!(
            classify_response(&json!({"status": "failed", "message": "No space left on device"})),
            DeliveryReason::NoSpace
        );
    }

    #[test]
    fn test_retryable_fallthrough() {
        assert_eq!(
            classify_response(&json!({"status": "failed", "retcode": 1400, "message": "timeout"})),
            DeliveryReason::Retryable
        );
        assert_eq!(classify_response(&json!({})), DeliveryReason::Retryable);
        assert!(DeliveryReason::Retryable.is_retryable());
        assert!(!DeliveryReason::FileError.is_retryable());
    }
}
