//! Per-caller sliding window rate limiter.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

/// Maximum number of callers tracked before idle entries are evicted.
const MAX_TRACKED_CALLERS: usize = 10_000;

/// Admits at most `max` requests per key within any trailing `window`.
///
/// Each key keeps a queue of admission timestamps. Timestamps older than the
/// window are dropped on every check, so the queue length is the number of
/// admissions in the current window.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    window: Duration,
    max: u32,
    history: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max: u32) -> Self {
        Self {
            window,
            max,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// A zero window or zero max admits everything.
    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero() && self.max > 0
    }

    /// Admit or reject a request for `key` now.
    ///
    /// On rejection returns how long until the oldest admission leaves the
    /// window.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.check_at(key, Instant::now())
    }

    pub(crate) fn check_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());

        if !history.contains_key(key) && history.len() >= MAX_TRACKED_CALLERS {
            self.evict_idle(&mut history, now);
        }

        let queue = history.entry(key.to_string()).or_default();
        while queue
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            queue.pop_front();
        }

        if queue.len() >= self.max as usize {
            let retry_after = queue
                .front()
                .map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(self.window);
            return Err(retry_after);
        }

        queue.push_back(now);
        Ok(())
    }

    fn evict_idle(&self, history: &mut HashMap<String, VecDeque<Instant>>, now: Instant) {
        let before = history.len();
        history.retain(|_, queue| {
            queue
                .back()
                .is_some_and(|t| now.saturating_duration_since(*t) < self.window)
        });
        warn!(
            evicted = before - history.len(),
            "Rate limiter history at capacity, evicted idle callers"
        );
    }

    /// Number of callers with tracked history.
    pub fn tracked_callers(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
