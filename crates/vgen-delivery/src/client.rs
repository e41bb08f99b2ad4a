//! Chat transport client.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use vgen_models::{ArtifactKind, ArtifactRef, Destination};

use crate::classify::{classify_response, response_message, DeliveryReason};
use crate::config::DeliveryConfig;
use crate::error::{DeliveryError, DeliveryResult};
use crate::metrics;

/// Bookkeeping for one delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAttempt {
    pub destination: Destination,
    pub payload: ArtifactKind,
    pub attempts: u32,
    /// Reason reported by the last failed attempt
    pub last_reason: Option<String>,
}

impl DeliveryAttempt {
    fn new(destination: &Destination, payload: &ArtifactRef) -> Self {
        Self {
            destination: destination.clone(),
            payload: payload.kind(),
            attempts: 0,
            last_reason: None,
        }
    }
}

/// Outcome of a single POST.
enum SendOutcome {
    Delivered,
    Fatal(DeliveryError),
    Retry(String),
}

/// Posts video messages to the chat transport.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    http: Client,
    base_url: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl DeliveryClient {
    pub fn new(config: &DeliveryConfig) -> DeliveryResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeliveryError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
        })
    }

    fn endpoint(&self, destination: &Destination) -> String {
        match destination {
            Destination::Private { .. } => format!("{}/send_private_msg", self.base_url),
            Destination::Group { .. } => format!("{}/send_group_msg", self.base_url),
        }
    }

    fn message_body(destination: &Destination, payload: &ArtifactRef) -> Value {
        let message = json!([{ "type": "video", "data": { "file": payload.as_str() } }]);
        match destination {
            Destination::Private { user_id } => json!({ "user_id": user_id, "message": message }),
            Destination::Group { group_id } => json!({ "group_id": group_id, "message": message }),
        }
    }

    /// Send `payload` to `destination`.
    ///
    /// Risk control, file and disk errors and non-200 statuses end the
    /// delivery at once. Other failures are retried with doubling delay
    /// until the attempt budget runs out.
    pub async fn deliver(
        &self,
        destination: &Destination,
        payload: &ArtifactRef,
    ) -> DeliveryResult<DeliveryAttempt> {
        let url = self.endpoint(destination);
        let body = Self::message_body(destination, payload);
        let mut attempt = DeliveryAttempt::new(destination, payload);
        let mut delay = self.base_delay;

        debug!(destination = %destination, payload = %payload, "Delivering video");

        for n in 1..=self.max_attempts {
            attempt.attempts = n;

            match self.send_once(&url, &body).await {
                SendOutcome::Delivered => {
                    info!(destination = %destination, attempts = n, "Video delivered");
                    metrics::record_delivery(DeliveryReason::Ok.as_str());
                    return Ok(attempt);
                }
                SendOutcome::Fatal(fatal) => {
                    error!(
                        destination = %destination,
                        reason = fatal.reason_code(),
                        "Delivery failed, not retrying: {}", fatal
                    );
                    metrics::record_delivery(fatal.reason_code());
                    return Err(fatal);
                }
                SendOutcome::Retry(reason) => {
                    warn!(
                        destination = %destination,
                        attempt = n,
                        max_attempts = self.max_attempts,
                        "Delivery attempt failed: {}", reason
                    );
                    metrics::record_delivery(DeliveryReason::Retryable.as_str());
                    attempt.last_reason = Some(reason);
                }
            }

            if n < self.max_attempts {
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
        }

        error!(destination = %destination, attempts = attempt.attempts, "Delivery retries exhausted");
        Err(DeliveryError::RetriesExhausted {
            attempts: attempt.attempts,
            last_error: attempt.last_reason.clone().unwrap_or_default(),
        })
    }

    async fn send_once(&self, url: &str, body: &Value) -> SendOutcome {
        let response = match self.http.post(url).json(body).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return SendOutcome::Retry("request timed out".into()),
            Err(e) => return SendOutcome::Retry(e.to_string()),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return SendOutcome::Retry(e.to_string()),
        };

        if status.as_u16() != 200 {
            return SendOutcome::Fatal(DeliveryError::TransportStatus {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let reply: Value = match serde_json::from_str(&text) {
            Ok(reply) => reply,
            Err(e) => return SendOutcome::Retry(format!("invalid reply: {}", e)),
        };

        let reason = classify_response(&reply);
        if reason == DeliveryReason::Ok {
            return SendOutcome::Delivered;
        }

        let message = response_message(&reply);
        match DeliveryError::from_reason(reason, message) {
            Some(fatal) => SendOutcome::Fatal(fatal),
            None => SendOutcome::Retry(format!(
                "{} (retcode {})",
                if message.is_empty() { "unknown error" } else { message },
                reply
                    .get("retcode")
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "none".into())
            )),
        }
    }
}
