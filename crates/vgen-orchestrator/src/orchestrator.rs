//! Submit-and-poll driver for one generation.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, Instrument};
use vgen_models::{ArtifactRef, GenerationRequest, Job, JobId, ProviderProfile};
use vgen_providers::{AdapterRegistry, HttpCall, NormalizedStatus, ProviderAdapter};

use crate::circuit_breaker::{BreakerRegistry, CircuitBreaker};
use crate::config::OrchestratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::http::ProviderHttp;
use crate::logging::JobLogger;
use crate::metrics;
use crate::retry::{retry_async, RetryConfig};

/// Poll loop limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between polls
    pub interval: Duration,
    /// Zero disables the timeout
    pub timeout: Duration,
    /// Zero means unlimited
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(900),
            max_attempts: 0,
        }
    }
}

/// Drives generations against providers.
///
/// Cheap to share behind an `Arc`; the breaker registry is the only shared
/// mutable state.
pub struct JobOrchestrator {
    registry: AdapterRegistry,
    http: ProviderHttp,
    breakers: Option<Arc<BreakerRegistry>>,
    submit_retry: RetryConfig,
    poll: PollPolicy,
}

impl JobOrchestrator {
    /// Create an orchestrator with the built-in adapters.
    pub fn new(config: &OrchestratorConfig) -> GenerationResult<Self> {
        let http = ProviderHttp::new(config.api.request_timeout(), config.proxy.active_url())?;
        Ok(Self::with_parts(AdapterRegistry::with_defaults(), http, config))
    }

    pub fn with_parts(
        registry: AdapterRegistry,
        http: ProviderHttp,
        config: &OrchestratorConfig,
    ) -> Self {
        let breakers = config
            .circuit_breaker
            .enabled
            .then(|| Arc::new(BreakerRegistry::new(config.circuit_breaker.settings())));

        Self {
            registry,
            http,
            breakers,
            submit_retry: config.api.submit_retry(),
            poll: config.api.poll_policy(),
        }
    }

    pub fn with_submit_retry(mut self, retry: RetryConfig) -> Self {
        self.submit_retry = retry;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Breaker registry, if breakers are enabled.
    pub fn breakers(&self) -> Option<&BreakerRegistry> {
        self.breakers.as_deref()
    }

    /// Breaker guarding `request`'s provider.
    pub fn breaker_for(&self, request: &GenerationRequest) -> Option<Arc<CircuitBreaker>> {
        self.breakers
            .as_ref()
            .map(|registry| registry.get(&request.breaker_key()))
    }

    /// Submit `request` and wait for the provider to finish it.
    ///
    /// Never panics: a panic inside the generation is caught, counted as a
    /// breaker failure and returned as [`GenerationError::Internal`]. The
    /// breaker sees exactly one outcome per call that reached the provider.
    pub async fn submit_and_wait(&self, request: &GenerationRequest) -> GenerationResult<ArtifactRef> {
        let job_id = JobId::new();
        let provider = request.profile.format.as_str();
        let logger = JobLogger::new(&job_id, provider, "generate");
        let breaker = self.breaker_for(request);
        let attempted = AtomicBool::new(false);

        let outcome = AssertUnwindSafe(self.generate(
            request,
            job_id,
            &logger,
            breaker.as_deref(),
            &attempted,
        ))
        .catch_unwind()
        .instrument(logger.create_span())
        .await;

        let (result, counted) = match outcome {
            Ok(result) => (result, attempted.load(Ordering::Acquire)),
            Err(panic) => {
                logger.log_error(&format!("panic during generation: {}", panic_message(panic.as_ref())));
                metrics::record_generation(provider, "internal", Duration::ZERO);
                (Err(GenerationError::internal("unexpected error during generation")), true)
            }
        };

        if let Some(breaker) = breaker.as_deref().filter(|_| counted) {
            match &result {
                Ok(_) => breaker.record_success(),
                Err(_) => breaker.record_failure(),
            }
        }

        result
    }

    /// Runs one generation. Sets `attempted` once the breaker has admitted the
    /// call; the caller records the breaker outcome.
    async fn generate(
        &self,
        request: &GenerationRequest,
        job_id: JobId,
        logger: &JobLogger,
        breaker: Option<&CircuitBreaker>,
        attempted: &AtomicBool,
    ) -> GenerationResult<ArtifactRef> {
        let profile = &request.profile;
        let adapter = self.registry.get(profile.format)?;
        let submit_call = adapter.build_submit(request, profile)?;

        if let Some(breaker) = breaker {
            if !breaker.allow() {
                logger.log_warning(&format!("circuit open for {}, skipping provider", breaker.key()));
                metrics::record_generation(profile.format.as_str(), "circuit_open", Duration::ZERO);
                return Err(GenerationError::CircuitOpen {
                    key: breaker.key().to_string(),
                });
            }
        }
        attempted.store(true, Ordering::Release);

        logger.log_start(if request.is_image_to_video() {
            "image-to-video"
        } else {
            "text-to-video"
        });

        let started = Instant::now();
        let result = self
            .run_job(adapter.as_ref(), &submit_call, profile, job_id, logger)
            .await;

        let outcome = match &result {
            Ok(artifact) => {
                logger.log_completion(&artifact.describe());
                "ok"
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                e.reason_code()
            }
        };
        metrics::record_generation(profile.format.as_str(), outcome, started.elapsed());

        result
    }

    async fn run_job(
        &self,
        adapter: &dyn ProviderAdapter,
        submit_call: &HttpCall,
        profile: &ProviderProfile,
        job_id: JobId,
        logger: &JobLogger,
    ) -> GenerationResult<ArtifactRef> {
        let http = &self.http;
        let (submitted, submit_attempts) =
            retry_async(&self.submit_retry, move || http.execute(submit_call)).await;
        let body = submitted?;

        let provider_job_id = adapter.parse_submit(&body)?;
        let mut job = Job::new(job_id, provider_job_id, adapter.format(), submit_attempts);
        logger.log_progress(&format!(
            "submitted as {} after {} attempt(s)",
            job.provider_job_id, job.submit_attempts
        ));

        self.poll_job(adapter, &mut job, profile).await
    }

    async fn poll_job(
        &self,
        adapter: &dyn ProviderAdapter,
        job: &mut Job,
        profile: &ProviderProfile,
    ) -> GenerationResult<ArtifactRef> {
        let poll_call = adapter.build_poll(&job.provider_job_id, profile);
        let started = Instant::now();

        let result = loop {
            let elapsed = started.elapsed();
            if !self.poll.timeout.is_zero() && elapsed > self.poll.timeout {
                break Err(GenerationError::PollTimeout { elapsed });
            }
            if self.poll.max_attempts > 0 && job.poll_attempts >= self.poll.max_attempts {
                break Err(GenerationError::PollExhausted {
                    attempts: job.poll_attempts,
                });
            }

            job.record_poll();
            let body = match self.http.execute(&poll_call).await {
                Ok(body) => body,
                Err(e) => break Err(e),
            };

            match adapter.parse_poll(&body) {
                NormalizedStatus::Pending => {
                    debug!(
                        job_id = %job.id,
                        poll_attempts = job.poll_attempts,
                        "Job still pending"
                    );
                    tokio::time::sleep(self.poll.interval).await;
                }
                NormalizedStatus::Succeeded(artifact) if artifact.is_empty() => {
                    break Err(GenerationError::malformed(
                        "provider reported success without a video reference",
                    ));
                }
                NormalizedStatus::Succeeded(artifact) => break Ok(artifact),
                NormalizedStatus::Failed(message) => break Err(GenerationError::ProviderFailure(message)),
            }
        };

        // A pending job always accepts its first terminal transition
        let _ = match &result {
            Ok(_) => job.succeed(),
            Err(_) => job.fail(),
        };

        result
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
