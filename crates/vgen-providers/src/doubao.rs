//! Doubao (Volcengine Ark) content generation adapter.
//!
//! The prompt and optional image travel together as a `content` array; the
//! task is polled by id in the path.

use serde::Serialize;
use vgen_models::{GenerationRequest, ProviderFormat, ProviderProfile};

use crate::adapter::ProviderAdapter;
use crate::call::HttpCall;
use crate::error::{ProviderError, ProviderResult};

const DEFAULT_RATIO: &str = "adaptive";
const DEFAULT_DURATION_SECS: u32 = 5;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitPayload<'a> {
    model: &'a str,
    content: Vec<ContentPart<'a>>,
    ratio: &'a str,
    duration: u32,
    watermark: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    generate_audio: Option<bool>,
}

/// Adapter for the `doubao` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct DoubaoAdapter;

impl DoubaoAdapter {
    fn duration(profile: &ProviderProfile) -> ProviderResult<u32> {
        match profile.seconds.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_DURATION_SECS),
            Some(s) => s.parse().map_err(|_| {
                ProviderError::invalid_profile(format!("seconds must be an integer, got '{}'", s))
            }),
        }
    }
}

impl ProviderAdapter for DoubaoAdapter {
    fn format(&self) -> ProviderFormat {
        ProviderFormat::Doubao
    }

    fn build_submit(
        &self,
        request: &GenerationRequest,
        profile: &ProviderProfile,
    ) -> ProviderResult<HttpCall> {
        let mut content = vec![ContentPart::Text {
            text: &request.prompt,
        }];
        if let Some(image) = &request.image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.as_wire(),
                },
            });
        }

        let payload = SubmitPayload {
            model: profile.effective_model(),
            content,
            ratio: profile.ratio.as_deref().unwrap_or(DEFAULT_RATIO),
            duration: Self::duration(profile)?,
            watermark: profile.watermark,
            // Only sent when switched on
            generate_audio: profile.generate_audio.filter(|on| *on),
        };

        Ok(HttpCall::post_json(
            format!("{}/contents/generations/tasks", profile.effective_base_url()),
            profile.bearer_token(),
            serde_json::to_value(payload)?,
        ))
    }

    fn build_poll(&self, job_id: &str, profile: &ProviderProfile) -> HttpCall {
        HttpCall::get(
            format!(
                "{}/contents/generations/tasks/{}",
                profile.effective_base_url(),
                urlencoding::encode(job_id)
            ),
            profile.bearer_token(),
        )
        .with_json_content_type()
    }
}
