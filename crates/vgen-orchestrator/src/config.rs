//! Orchestrator configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::circuit_breaker::BreakerSettings;
use crate::orchestrator::PollPolicy;
use crate::retry::RetryConfig;

/// Convert seconds from config into a duration. Negative and NaN become zero.
pub(crate) fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

/// Provider HTTP timing and retry settings. All durations are in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Per-request timeout for submit and poll calls
    pub request_timeout_seconds: f64,
    /// Retries after the first submit attempt
    pub submit_max_retries: u32,
    /// Base backoff, doubled per retry
    pub submit_backoff_seconds: f64,
    pub poll_interval_seconds: f64,
    /// Zero disables the poll timeout
    pub poll_timeout_seconds: f64,
    /// Zero means unlimited
    pub poll_max_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 120.0,
            submit_max_retries: 2,
            submit_backoff_seconds: 2.0,
            poll_interval_seconds: 5.0,
            poll_timeout_seconds: 900.0,
            poll_max_attempts: 0,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        secs(self.request_timeout_seconds)
    }

    pub fn submit_retry(&self) -> RetryConfig {
        RetryConfig::new("submit")
            .with_max_retries(self.submit_max_retries)
            .with_base_delay(secs(self.submit_backoff_seconds))
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: secs(self.poll_interval_seconds),
            timeout: secs(self.poll_timeout_seconds),
            max_attempts: self.poll_max_attempts,
        }
    }
}

/// Circuit breaker thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub enabled: bool,
    pub failure_threshold: u32,
    pub recovery_seconds: u64,
    pub half_open_max_success: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 5,
            recovery_seconds: 120,
            half_open_max_success: 2,
        }
    }
}

impl BreakerConfig {
    pub fn settings(&self) -> BreakerSettings {
        BreakerSettings::new(
            self.failure_threshold,
            Duration::from_secs(self.recovery_seconds),
            self.half_open_max_success,
        )
    }
}

/// Outbound HTTP proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://127.0.0.1:7890".to_string(),
        }
    }
}

impl ProxyConfig {
    /// Proxy URL when enabled.
    pub fn active_url(&self) -> Option<&str> {
        (self.enabled && !self.url.trim().is_empty()).then(|| self.url.trim())
    }
}

/// Everything the orchestrator needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub api: ApiConfig,
    pub circuit_breaker: BreakerConfig,
    pub proxy: ProxyConfig,
}
