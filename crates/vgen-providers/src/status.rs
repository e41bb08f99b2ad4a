//! Poll status normalization.

use serde_json::Value;
use vgen_models::{ArtifactRef, JobStatus};

use crate::extract::{extract_artifact, ExtractionStrategy};

/// Maximum characters of provider failure text carried forward.
const MAX_FAILURE_TEXT: usize = 200;

/// Coarse class of a provider status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Succeeded,
    Failed,
    Pending,
}

/// Map a provider status word onto [`StatusClass`]. Case-insensitive.
pub fn classify_status(status: &str) -> StatusClass {
    match status.trim().to_lowercase().as_str() {
        "completed" | "succeeded" | "success" | "succeed" => StatusClass::Succeeded,
        "failed" | "error" | "expired" => StatusClass::Failed,
        _ => StatusClass::Pending,
    }
}

/// Provider poll result in normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedStatus {
    Pending,
    /// Finished; the artifact may be empty if no known shape matched
    Succeeded(ArtifactRef),
    /// Provider reported failure, with its message
    Failed(String),
}

impl NormalizedStatus {
    pub fn job_status(&self) -> JobStatus {
        match self {
            NormalizedStatus::Pending => JobStatus::Pending,
            NormalizedStatus::Succeeded(_) => JobStatus::Succeeded,
            NormalizedStatus::Failed(_) => JobStatus::Failed,
        }
    }

    /// Normalize a poll body using the given extraction precedence.
    pub fn from_body(body: &Value, strategies: &[ExtractionStrategy]) -> Self {
        let status = body.get("status").and_then(Value::as_str).unwrap_or_default();

        match classify_status(status) {
            StatusClass::Succeeded => NormalizedStatus::Succeeded(extract_artifact(body, strategies)),
            StatusClass::Failed => NormalizedStatus::Failed(failure_text(body)),
            StatusClass::Pending => NormalizedStatus::Pending,
        }
    }
}

/// Provider failure text: `error`, then `message`, then the whole body.
fn failure_text(body: &Value) -> String {
    let text = ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(value_text)
        .unwrap_or_else(|| body.to_string());

    truncate_chars(&text, MAX_FAILURE_TEXT)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
