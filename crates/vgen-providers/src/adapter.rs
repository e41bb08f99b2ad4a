//! Provider adapter trait.

use serde_json::Value;
use vgen_models::{GenerationRequest, ProviderFormat, ProviderProfile};

use crate::call::HttpCall;
use crate::error::{ProviderError, ProviderResult};
use crate::extract::{ExtractionStrategy, DEFAULT_STRATEGIES};
use crate::status::NormalizedStatus;

/// Translation between normalized requests and one provider wire format.
///
/// Implementations must be deterministic and free of I/O; the orchestrator
/// owns transport, retry and timing.
pub trait ProviderAdapter: Send + Sync {
    /// Format handled by this adapter.
    fn format(&self) -> ProviderFormat;

    /// Build the submit call for `request` against `profile`.
    fn build_submit(
        &self,
        request: &GenerationRequest,
        profile: &ProviderProfile,
    ) -> ProviderResult<HttpCall>;

    /// Name of the job identifier field in the submit response.
    fn job_id_field(&self) -> &'static str {
        "id"
    }

    /// Extract the provider job identifier from a submit response.
    fn parse_submit(&self, body: &Value) -> ProviderResult<String> {
        let field = self.job_id_field();
        match body.get(field) {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(ProviderError::malformed(format!(
                "{} submit response has no '{}': {}",
                self.format(),
                field,
                crate::status::truncate_chars(&body.to_string(), 100)
            ))),
        }
    }

    /// Build the poll call for a submitted job.
    fn build_poll(&self, job_id: &str, profile: &ProviderProfile) -> HttpCall;

    /// Artifact extraction precedence for this provider.
    fn extraction_strategies(&self) -> &'static [ExtractionStrategy] {
        DEFAULT_STRATEGIES
    }

    /// Normalize a poll response.
    fn parse_poll(&self, body: &Value) -> NormalizedStatus {
        NormalizedStatus::from_body(body, self.extraction_strategies())
    }
}
