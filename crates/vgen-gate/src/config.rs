//! Gate configuration.

use std::time::Duration;

use serde::Deserialize;
use vgen_models::CallerId;

/// Admission limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Maximum concurrent generations across all callers
    pub max_requests: usize,
    /// Maximum concurrent generations per caller
    pub max_requests_per_user: usize,
    /// Sliding window length; 0 disables the rate limit
    pub rate_limit_window_seconds: u64,
    /// Requests admitted per caller within one window; 0 disables the rate limit
    pub max_requests_per_window: u32,
    /// Callers exempt from the per-caller pool and the rate limit
    pub admin_users: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_requests: 3,
            max_requests_per_user: 1,
            rate_limit_window_seconds: 120,
            max_requests_per_window: 3,
            admin_users: Vec::new(),
        }
    }
}

impl GateConfig {
    pub fn is_admin(&self, caller: &CallerId) -> bool {
        self.admin_users.iter().any(|a| a == caller.as_str())
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_seconds)
    }
}
