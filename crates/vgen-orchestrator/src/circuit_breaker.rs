//! Circuit breaker for video providers.
//!
//! One breaker per provider key, shared across all in-flight jobs through a
//! [`BreakerRegistry`]. State lives only for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::metrics;

/// Breaker thresholds, each at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub recovery: Duration,
    pub half_open_max_success: u32,
}

impl BreakerSettings {
    pub fn new(failure_threshold: u32, recovery: Duration, half_open_max_success: u32) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            recovery: recovery.max(Duration::from_secs(1)),
            half_open_max_success: half_open_max_success.max(1),
        }
    }
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(120), 2)
    }
}

/// Observable breaker phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, counting consecutive failures
    Closed { failures: u32 },
    /// Failing fast until the recovery window passes
    Open { opened_at: Instant },
    /// Recovery window passed, counting trial successes
    HalfOpen { successes: u32 },
}

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    opened_at: Option<Instant>,
    half_open_success: u32,
}

/// Failure isolation for one provider key.
#[derive(Debug)]
pub struct CircuitBreaker {
    key: String,
    settings: BreakerSettings,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(key: impl Into<String>, settings: BreakerSettings) -> Self {
        Self {
            key: key.into(),
            settings,
            state: Mutex::new(BreakerState::default()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn recovered(&self, opened_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(opened_at) >= self.settings.recovery
    }

    /// Check if a call is allowed.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    pub(crate) fn allow_at(&self, now: Instant) -> bool {
        match self.lock().opened_at {
            None => true,
            Some(opened_at) => self.recovered(opened_at, now),
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        self.record_success_at(Instant::now())
    }

    pub(crate) fn record_success_at(&self, now: Instant) {
        let mut state = self.lock();
        match state.opened_at {
            None => state.failure_count = 0,
            // Stale completion of a call admitted before the breaker opened
            Some(opened_at) if !self.recovered(opened_at, now) => {}
            Some(_) => {
                state.half_open_success += 1;
                if state.half_open_success >= self.settings.half_open_max_success {
                    *state = BreakerState::default();
                    info!(breaker = %self.key, "Circuit closed after successful trial calls");
                }
            }
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now())
    }

    pub(crate) fn record_failure_at(&self, now: Instant) {
        let mut state = self.lock();
        if let Some(opened_at) = state.opened_at {
            if !self.recovered(opened_at, now) {
                return;
            }
        }

        state.failure_count = state.failure_count.saturating_add(1);
        if state.failure_count >= self.settings.failure_threshold {
            let reopened = state.opened_at.is_some();
            state.opened_at = Some(now);
            state.half_open_success = 0;
            warn!(
                breaker = %self.key,
                failures = state.failure_count,
                reopened,
                "Circuit opened"
            );
            metrics::record_breaker_open(&self.key);
        }
    }

    /// Current phase.
    pub fn state(&self) -> CircuitState {
        self.state_at(Instant::now())
    }

    pub(crate) fn state_at(&self, now: Instant) -> CircuitState {
        let state = self.lock();
        match state.opened_at {
            None => CircuitState::Closed {
                failures: state.failure_count,
            },
            Some(opened_at) if !self.recovered(opened_at, now) => CircuitState::Open { opened_at },
            Some(_) => CircuitState::HalfOpen {
                successes: state.half_open_success,
            },
        }
    }
}

/// Hands out one shared breaker per provider key.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    settings: BreakerSettings,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new(settings: BreakerSettings) -> Self {
        Self {
            settings,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Breaker for `key`, created on first use.
    pub fn get(&self, key: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            breakers
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(CircuitBreaker::new(key, self.settings))),
        )
    }

    pub fn len(&self) -> usize {
        self.breakers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
