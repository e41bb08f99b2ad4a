//! OpenAI-style `/videos` adapter.

use serde::Serialize;
use vgen_models::{GenerationRequest, ProviderFormat, ProviderProfile};

use crate::adapter::ProviderAdapter;
use crate::call::HttpCall;
use crate::error::ProviderResult;

const DEFAULT_SECONDS: &str = "10";

#[derive(Debug, Serialize)]
struct SubmitPayload<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    seconds: &'a str,
    watermark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<&'a str>>,
}

/// Adapter for the `openai` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAiAdapter;

impl ProviderAdapter for OpenAiAdapter {
    fn format(&self) -> ProviderFormat {
        ProviderFormat::OpenAi
    }

    fn build_submit(
        &self,
        request: &GenerationRequest,
        profile: &ProviderProfile,
    ) -> ProviderResult<HttpCall> {
        let payload = SubmitPayload {
            model: profile.effective_model(),
            prompt: &request.prompt,
            size: profile.size.as_deref(),
            seconds: profile.seconds.as_deref().unwrap_or(DEFAULT_SECONDS),
            watermark: profile.watermark,
            images: request.image.as_ref().map(|img| vec![img.as_wire()]),
        };

        Ok(HttpCall::post_json(
            format!("{}/videos", profile.effective_base_url()),
            profile.bearer_token(),
            serde_json::to_value(payload)?,
        ))
    }

    fn build_poll(&self, job_id: &str, profile: &ProviderProfile) -> HttpCall {
        HttpCall::get(
            format!(
                "{}/videos/{}",
                profile.effective_base_url(),
                urlencoding::encode(job_id)
            ),
            profile.bearer_token(),
        )
    }
}
