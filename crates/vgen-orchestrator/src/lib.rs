//! Job orchestration for video generation providers.
//!
//! [`JobOrchestrator`] drives one generation from submission to a terminal
//! status: it consults the per-provider [`CircuitBreaker`], submits through
//! the matching adapter with bounded retry, then polls until the provider
//! reports success, failure, or a poll limit is hit.

pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod retry;

pub use circuit_breaker::{BreakerRegistry, BreakerSettings, CircuitBreaker, CircuitState};
pub use config::{ApiConfig, BreakerConfig, OrchestratorConfig, ProxyConfig};
pub use error::{GenerationError, GenerationResult};
pub use http::ProviderHttp;
pub use logging::JobLogger;
pub use orchestrator::{JobOrchestrator, PollPolicy};
pub use retry::RetryConfig;
