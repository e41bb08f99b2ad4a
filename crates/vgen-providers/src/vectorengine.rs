//! VectorEngine unified video adapter.

use serde::Serialize;
use vgen_models::{GenerationRequest, ProviderFormat, ProviderProfile};

use crate::adapter::ProviderAdapter;
use crate::call::HttpCall;
use crate::error::ProviderResult;

#[derive(Debug, Serialize)]
struct SubmitPayload<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orientation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<&'a str>>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Adapter for the `vectorengine` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorEngineAdapter;

impl ProviderAdapter for VectorEngineAdapter {
    fn format(&self) -> ProviderFormat {
        ProviderFormat::VectorEngine
    }

    fn build_submit(
        &self,
        request: &GenerationRequest,
        profile: &ProviderProfile,
    ) -> ProviderResult<HttpCall> {
        let payload = SubmitPayload {
            model: profile.effective_model(),
            prompt: &request.prompt,
            size: non_empty(&profile.resolution),
            aspect_ratio: non_empty(&profile.aspect_ratio),
            orientation: non_empty(&profile.orientation),
            images: request.image.as_ref().map(|img| vec![img.as_wire()]),
        };

        Ok(HttpCall::post_json(
            format!("{}/video/create", profile.effective_base_url()),
            profile.bearer_token(),
            serde_json::to_value(payload)?,
        ))
    }

    fn build_poll(&self, job_id: &str, profile: &ProviderProfile) -> HttpCall {
        HttpCall::get(
            format!(
                "{}/video/query?id={}",
                profile.effective_base_url(),
                urlencoding::encode(job_id)
            ),
            profile.bearer_token(),
        )
    }
}
