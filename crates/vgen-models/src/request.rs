//! Generation requests.

use serde::{Deserialize, Serialize};

use crate::profile::ProviderProfile;

/// Input image attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InputImage {
    /// Raw base64 payload
    Inline(String),
    /// Externally reachable URL (e.g. a temporary object-store link)
    Url(String),
}

impl InputImage {
    /// The value placed into the provider payload.
    pub fn as_wire(&self) -> &str {
        match self {
            InputImage::Inline(data) => data,
            InputImage::Url(url) => url,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, InputImage::Url(_))
    }
}

/// Requested output framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoShape {
    /// Provider default framing
    #[default]
    Default,
    Landscape,
    Portrait,
}

/// One generation request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,
    /// Optional input image
    pub image: Option<InputImage>,
    /// Target provider
    pub profile: ProviderProfile,
    /// Configured provider id, used to partition breaker state
    pub provider_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, profile: ProviderProfile) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            profile,
            provider_id: None,
        }
    }

    pub fn with_image(mut self, image: InputImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Key identifying the breaker for this request's provider.
    ///
    /// Provider id if present, else the configured base URL, else `default`.
    pub fn breaker_key(&self) -> String {
        self.provider_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.profile.base_url.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or("default")
            .to_string()
    }

    /// Whether this is an image-to-video request.
    pub fn is_image_to_video(&self) -> bool {
        self.image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProviderFormat;

    #[test]
    fn test_breaker_key_precedence() {
        let profile = ProviderProfile::new(ProviderFormat::OpenAi, "https://api.x/v1", "k");
        let req = GenerationRequest::new("a cat", profile.clone());
        assert_eq!(req.breaker_key(), "https://api.x/v1");

        let req = req.with_provider_id("model1");
        assert_eq!(req.breaker_key(), "model1");

        let bare = ProviderProfile {
            api_key: "k".into(),
            ..Default::default()
        };
        assert_eq!(GenerationRequest::new("a cat", bare).breaker_key(), "default");
    }

    #[test]
    fn test_input_image_wire_value() {
        assert_eq!(InputImage::Inline("aGVsbG8=".into()).as_wire(), "aGVsbG8=");
        let url = InputImage::Url("https://cdn/x.png".into());
        assert!(url.is_url());
        assert_eq!(url.as_wire(), "https://cdn/x.png");
    }
}
