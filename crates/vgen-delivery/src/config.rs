//! Delivery configuration.

use std::time::Duration;

use serde::Deserialize;

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

/// Chat transport endpoint and retry settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub host: String,
    pub port: u16,
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt, doubled each time
    pub base_delay_seconds: f64,
    pub timeout_seconds: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5700,
            max_attempts: 2,
            base_delay_seconds: 2.0,
            timeout_seconds: 480.0,
        }
    }
}

impl DeliveryConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn base_delay(&self) -> Duration {
        secs(self.base_delay_seconds)
    }

    pub fn timeout(&self) -> Duration {
        secs(self.timeout_seconds)
    }
}

/// How a finished video is handed to the transport.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PayloadPolicy {
    /// Send provider URLs directly
    pub allow_url_send: bool,
    /// Download and send inline when a URL send fails
    pub url_send_fallback_to_download: bool,
    /// Largest download accepted for inline sending
    pub max_video_mb_for_base64: u64,
}

impl Default for PayloadPolicy {
    fn default() -> Self {
        Self {
            allow_url_send: true,
            url_send_fallback_to_download: true,
            max_video_mb_for_base64: 24,
        }
    }
}

impl PayloadPolicy {
    pub fn max_inline_bytes(&self) -> u64 {
        self.max_video_mb_for_base64.saturating_mul(1024 * 1024)
    }
}

/// Video download settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadConfig {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Retries after the first attempt on 5xx and connection errors
    pub max_retries: u32,
    pub backoff: Duration,
    pub max_bytes: u64,
    pub proxy: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(150),
            max_retries: 3,
            backoff: Duration::from_millis(1500),
            max_bytes: PayloadPolicy::default().max_inline_bytes(),
            proxy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeliveryConfig::default();
        assert_eq!(config.base_url(), "http://127.0.0.1:5700");
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.base_delay(), Duration::from_secs(2));
        assert_eq!(config.timeout(), Duration::from_secs(480));
        assert_eq!(PayloadPolicy::default().max_inline_bytes(), 24 * 1024 * 1024);
    }
}
