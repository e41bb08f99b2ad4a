//! Provider profiles.
//!
//! A profile is the read-only configuration for one provider endpoint. It is
//! owned by configuration and cloned into requests.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Wire format spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFormat {
    /// OpenAI-style `/videos` API
    #[default]
    OpenAi,
    /// SiliconFlow `/video/submit` + `/video/status`
    SiliconFlow,
    /// Volcengine Ark (Doubao) content generation tasks
    Doubao,
    /// VectorEngine unified video API
    VectorEngine,
}

impl ProviderFormat {
    /// All known formats.
    pub const ALL: [ProviderFormat; 4] = [
        ProviderFormat::OpenAi,
        ProviderFormat::SiliconFlow,
        ProviderFormat::Doubao,
        ProviderFormat::VectorEngine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderFormat::OpenAi => "openai",
            ProviderFormat::SiliconFlow => "siliconflow",
            ProviderFormat::Doubao => "doubao",
            ProviderFormat::VectorEngine => "vectorengine",
        }
    }

    /// Base URL used when the profile does not configure one.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderFormat::OpenAi => "https://api.openai.com/v1",
            ProviderFormat::SiliconFlow => "https://api.siliconflow.cn/v1",
            ProviderFormat::Doubao => "https://ark.cn-beijing.volces.com/api/v3",
            ProviderFormat::VectorEngine => "https://api.vectorengine.ai/v1",
        }
    }

    /// Model used when the profile does not configure one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderFormat::OpenAi => "sora-2",
            ProviderFormat::SiliconFlow => "Wan-AI/Wan2.2-I2V-A14B",
            ProviderFormat::Doubao => "doubao-seedance-1-0-pro-250528",
            ProviderFormat::VectorEngine => "grok-video-3",
        }
    }
}

impl fmt::Display for ProviderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which inputs a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SupportOption {
    /// Text-to-video only
    #[serde(rename = "1")]
    TextOnly,
    /// Image-to-video only
    #[serde(rename = "2")]
    ImageOnly,
    /// Both
    #[default]
    #[serde(rename = "3")]
    Both,
}

impl SupportOption {
    pub fn allows_text(&self) -> bool {
        !matches!(self, SupportOption::ImageOnly)
    }

    pub fn allows_image(&self) -> bool {
        !matches!(self, SupportOption::TextOnly)
    }
}

/// Immutable configuration for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderProfile {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Wire format
    #[serde(default)]
    pub format: ProviderFormat,
    /// API base URL (format default when absent)
    #[serde(default)]
    pub base_url: Option<String>,
    /// API credential, with or without a `Bearer ` prefix
    #[serde(default)]
    pub api_key: String,
    /// Model identifier (format default when absent)
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub support_option: SupportOption,
    /// Output size, e.g. `1280x720`
    #[serde(default)]
    pub size: Option<String>,
    /// Clip duration in seconds
    #[serde(default)]
    pub seconds: Option<String>,
    /// Resolution tier, e.g. `720p`
    #[serde(default)]
    pub resolution: Option<String>,
    /// Doubao ratio, e.g. `16:9` or `adaptive`
    #[serde(default)]
    pub ratio: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub orientation: Option<String>,
    #[serde(default)]
    pub watermark: bool,
    #[serde(default)]
    pub generate_audio: Option<bool>,
}

impl ProviderProfile {
    /// Create a profile with only the required fields set.
    pub fn new(format: ProviderFormat, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            format,
            base_url: Some(base_url.into()),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Base URL without trailing slashes.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.format.default_base_url())
            .trim_end_matches('/')
    }

    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.format.default_model())
    }

    /// API key with any `Bearer ` prefix removed.
    pub fn bearer_token(&self) -> &str {
        let key = self.api_key.trim();
        key.strip_prefix("Bearer ").unwrap_or(key)
    }

    /// Validate the profile.
    pub fn validate(&self) -> Result<(), String> {
        if self.bearer_token().is_empty() {
            return Err("api_key must not be empty".to_string());
        }

        let base = self.effective_base_url();
        let parsed = Url::parse(base).map_err(|e| format!("invalid base_url '{}': {}", base, e))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(format!("unsupported base_url scheme '{}'", other)),
        }

        if let Some(seconds) = &self.seconds {
            seconds
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("seconds must be an integer, got '{}'", seconds))?;
        }

        Ok(())
    }
}
