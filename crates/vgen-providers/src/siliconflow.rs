//! SiliconFlow adapter.
//!
//! Submits to `/video/submit` and polls `/video/status` with the request id in
//! a POST body.

use serde::Serialize;
use serde_json::json;
use vgen_models::{GenerationRequest, ProviderFormat, ProviderProfile};

use crate::adapter::ProviderAdapter;
use crate::call::HttpCall;
use crate::error::ProviderResult;

#[derive(Debug, Serialize)]
struct SubmitPayload<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

/// Adapter for the `siliconflow` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct SiliconFlowAdapter;

impl ProviderAdapter for SiliconFlowAdapter {
    fn format(&self) -> ProviderFormat {
        ProviderFormat::SiliconFlow
    }

    fn build_submit(
        &self,
        request: &GenerationRequest,
        profile: &ProviderProfile,
    ) -> ProviderResult<HttpCall> {
        let payload = SubmitPayload {
            model: profile.effective_model(),
            prompt: &request.prompt,
            image_size: profile.size.as_deref(),
            image: request.image.as_ref().map(|img| img.as_wire()),
        };

        Ok(HttpCall::post_json(
            format!("{}/video/submit", profile.effective_base_url()),
            profile.bearer_token(),
            serde_json::to_value(payload)?,
        ))
    }

    fn job_id_field(&self) -> &'static str {
        "requestId"
    }

    fn build_poll(&self, job_id: &str, profile: &ProviderProfile) -> HttpCall {
        HttpCall::post_json(
            format!("{}/video/status", profile.effective_base_url()),
            profile.bearer_token(),
            json!({ "requestId": job_id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::HttpMethod;
    use crate::status::NormalizedStatus;
    use vgen_models::{ArtifactRef, InputImage};

    fn profile() -> ProviderProfile {
        ProviderProfile::new(ProviderFormat::SiliconFlow, "https://api.sf.test/v1", "sk-sf")
    }

    #[test]
    fn test_build_submit() {
        let mut p = profile();
        p.size = Some("720x1280".into());
        let req = GenerationRequest::new("waves", p).with_image(InputImage::Inline("AAAA".into()));
        let call = SiliconFlowAdapter.build_submit(&req, &req.profile).unwrap();

        assert_eq!(call.url, "https://api.sf.test/v1/video/submit");
        assert_eq!(
            call.body.unwrap(),
            json!({
                "model": "Wan-AI/Wan2.2-I2V-A14B",
                "prompt": "waves",
                "image_size": "720x1280",
                "image": "AAAA"
            })
        );
    }

    #[test]
    fn test_parse_submit_uses_request_id() {
        assert_eq!(
            SiliconFlowAdapter.parse_submit(&json!({"requestId": "req-9"})).unwrap(),
            "req-9"
        );
        assert!(SiliconFlowAdapter.parse_submit(&json!({"id": "req-9"})).is_err());
    }

    #[test]
    fn test_build_poll_posts_id_in_body() {
        let call = SiliconFlowAdapter.build_poll("req-9", &profile());
        assert_eq!(call.method, HttpMethod::Post);
        assert_eq!(call.url, "https://api.sf.test/v1/video/status");
        assert_eq!(call.body.unwrap(), json!({"requestId": "req-9"}));
    }

    #[test]
    fn test_parse_poll_results_list() {
        let body = json!({"status": "Succeed", "results": {"videos": [{"url": "http://sf/v.mp4"}]}});
        assert_eq!(
            SiliconFlowAdapter.parse_poll(&body),
            NormalizedStatus::Succeeded(ArtifactRef::url("http://sf/v.mp4"))
        );
    }
}
