//! Admission control for generation requests.
//!
//! A [`ConcurrencyGate`] bounds in-flight generations globally and per
//! caller, and applies a per-caller sliding-window rate limit. Admins bypass
//! the per-caller pool and the rate limit.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod metrics;
pub mod rate_limit;

pub use concurrency::{Admission, ConcurrencyGate, ConcurrencySlot, QueuedSlot};
pub use config::GateConfig;
pub use error::{GateError, GateResult};
pub use rate_limit::SlidingWindowLimiter;
