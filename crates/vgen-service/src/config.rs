//! Top-level service configuration.
//!
//! Loaded from an optional file plus `VGEN__`-prefixed environment variables,
//! e.g. `VGEN__COMPONENTS__MAX_REQUESTS=5` or
//! `VGEN__MODELS__MODEL1__API_KEY=sk-...`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use vgen_delivery::{DeliveryConfig, DownloadConfig, PayloadPolicy};
use vgen_gate::GateConfig;
use vgen_models::{ProviderFormat, ProviderProfile};
use vgen_orchestrator::{ApiConfig, BreakerConfig, OrchestratorConfig, ProxyConfig};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "VGEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("model '{0}' is not configured")]
    UnknownModel(String),

    #[error("model '{id}' is invalid: {reason}")]
    InvalidModel { id: String, reason: String },
}

/// Command and admission settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Id of the model under `models` used for generation
    pub command_model: String,
    pub max_requests: usize,
    pub max_requests_per_user: usize,
    pub rate_limit_window_seconds: u64,
    pub max_requests_per_window: u32,
    pub admin_users: Vec<String>,
    /// Tell the caller which model is being used
    pub enable_debug_info: bool,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        let gate = GateConfig::default();
        Self {
            command_model: "model1".to_string(),
            max_requests: gate.max_requests,
            max_requests_per_user: gate.max_requests_per_user,
            rate_limit_window_seconds: gate.rate_limit_window_seconds,
            max_requests_per_window: gate.max_requests_per_window,
            admin_users: gate.admin_users,
            enable_debug_info: false,
        }
    }
}

/// Prompt and payload settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Longest accepted prompt, in characters
    pub max_prompt_length: usize,
    pub allow_url_send: bool,
    pub url_send_fallback_to_download: bool,
    pub max_video_mb_for_base64: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        let policy = PayloadPolicy::default();
        Self {
            max_prompt_length: 800,
            allow_url_send: policy.allow_url_send,
            url_send_fallback_to_download: policy.url_send_fallback_to_download,
            max_video_mb_for_base64: policy.max_video_mb_for_base64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageUploaderConfig {
    pub enabled: bool,
}

/// Everything the service needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoGenConfig {
    pub components: ComponentsConfig,
    pub proxy: ProxyConfig,
    pub api: ApiConfig,
    pub video: VideoConfig,
    pub circuit_breaker: BreakerConfig,
    pub delivery: DeliveryConfig,
    pub image_uploader: ImageUploaderConfig,
    /// Provider profiles keyed by model id
    pub models: BTreeMap<String, ProviderProfile>,
}

impl VideoGenConfig {
    /// Load from `path` (TOML, JSON or YAML by extension) and the environment.
    ///
    /// Environment values win over the file. `components.admin_users` accepts
    /// a comma-separated list.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let config: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("components.admin_users"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            max_requests: self.components.max_requests,
            max_requests_per_user: self.components.max_requests_per_user,
            rate_limit_window_seconds: self.components.rate_limit_window_seconds,
            max_requests_per_window: self.components.max_requests_per_window,
            admin_users: self.components.admin_users.clone(),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            api: self.api.clone(),
            circuit_breaker: self.circuit_breaker.clone(),
            proxy: self.proxy.clone(),
        }
    }

    pub fn payload_policy(&self) -> PayloadPolicy {
        PayloadPolicy {
            allow_url_send: self.video.allow_url_send,
            url_send_fallback_to_download: self.video.url_send_fallback_to_download,
            max_video_mb_for_base64: self.video.max_video_mb_for_base64,
        }
    }

    /// Download settings for inline sending. Shares the provider proxy.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            max_bytes: self.payload_policy().max_inline_bytes(),
            proxy: self.proxy.active_url().map(str::to_string),
            ..Default::default()
        }
    }

    /// The profile selected by `components.command_model`, validated.
    pub fn active_model(&self) -> Result<(&str, &ProviderProfile), ConfigError> {
        let id = self.components.command_model.as_str();
        let profile = self
            .models
            .get(id)
            .ok_or_else(|| ConfigError::UnknownModel(id.to_string()))?;
        profile.validate().map_err(|reason| ConfigError::InvalidModel {
            id: id.to_string(),
            reason,
        })?;
        Ok((id, profile))
    }

    /// All configured models, with the active one marked.
    pub fn model_summaries(&self) -> Vec<ModelSummary> {
        self.models
            .iter()
            .map(|(id, profile)| ModelSummary {
                id: id.clone(),
                name: profile.name.clone().unwrap_or_else(|| id.clone()),
                format: profile.format,
                model: profile.effective_model().to_string(),
                active: *id == self.components.command_model,
            })
            .collect()
    }
}

/// One line of the model listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub format: ProviderFormat,
    pub model: String,
    pub active: bool,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({}/{})", self.id, self.name, self.format, self.model)?;
        if self.active {
            write!(f, " [active]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[components]
command_model = "sora"
max_requests = 5
admin_users = ["10001"]

[api]
poll_interval_seconds = 1.5

[video]
allow_url_send = false

[proxy]
enabled = true
url = "http://proxy:8080"

[models.sora]
name = "Sora 2"
format = "openai"
api_key = "sk-1"

[models.seed]
format = "doubao"
api_key = "ark-1"
support_option = "2"
"#;

    #[test]
    #[serial]
    fn test_defaults() {
        let config = VideoGenConfig::load(None).unwrap();
        assert_eq!(config.components.command_model, "model1");
        assert_eq!(config.components.max_requests, 3);
        assert_eq!(config.video.max_prompt_length, 800);
        assert_eq!(config.delivery.port, 5700);
        assert!(config.circuit_breaker.enabled);
        assert!(config.models.is_empty());
    }

    #[test]
    #[serial]
    fn test_load_file() {
        let file = write_toml(SAMPLE);
        let config = VideoGenConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.components.max_requests, 5);
        assert_eq!(config.components.max_requests_per_user, 1);
        assert_eq!(config.api.poll_interval_seconds, 1.5);
        assert!(!config.payload_policy().allow_url_send);
        assert_eq!(config.models.len(), 2);
        assert_eq!(
            config.models["seed"].support_option,
            vgen_models::SupportOption::ImageOnly
        );

        let gate = config.gate_config();
        assert_eq!(gate.max_requests, 5);
        assert_eq!(gate.admin_users, vec!["10001".to_string()]);

        assert_eq!(
            config.download_config().proxy.as_deref(),
            Some("http://proxy:8080")
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let file = write_toml(SAMPLE);
        std::env::set_var("VGEN__COMPONENTS__MAX_REQUESTS", "9");
        std::env::set_var("VGEN__COMPONENTS__ADMIN_USERS", "1,2");
        std::env::set_var("VGEN__MODELS__SORA__API_KEY", "sk-env");

        let config = VideoGenConfig::load(Some(file.path()));

        std::env::remove_var("VGEN__COMPONENTS__MAX_REQUESTS");
        std::env::remove_var("VGEN__COMPONENTS__ADMIN_USERS");
        std::env::remove_var("VGEN__MODELS__SORA__API_KEY");

        let config = config.unwrap();
        assert_eq!(config.components.max_requests, 9);
        assert_eq!(config.components.admin_users, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(config.models["sora"].api_key, "sk-env");
    }

    #[test]
    #[serial]
    fn test_only_prefixed_nested_env_keys_apply() {
        std::env::set_var("VGEN_MAX_REQUESTS", "7");
        std::env::set_var("VGEN__CIRCUIT_BREAKER__FAILURE_THRESHOLD", "9");
        std::env::set_var("VGEN__DELIVERY__PORT", "3000");

        let config = VideoGenConfig::load(None);

        std::env::remove_var("VGEN_MAX_REQUESTS");
        std::env::remove_var("VGEN__CIRCUIT_BREAKER__FAILURE_THRESHOLD");
        std::env::remove_var("VGEN__DELIVERY__PORT");

        let config = config.unwrap();
        assert_eq!(config.gate_config().max_requests, 3);
        assert_eq!(config.orchestrator_config().circuit_breaker.failure_threshold, 9);
        assert_eq!(config.delivery.base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    #[serial]
    fn test_active_model() {
        let file = write_toml(SAMPLE);
        let mut config = VideoGenConfig::load(Some(file.path())).unwrap();

        let (id, profile) = config.active_model().unwrap();
        assert_eq!(id, "sora");
        assert_eq!(profile.format, ProviderFormat::OpenAi);

        config.components.command_model = "missing".into();
        assert!(matches!(config.active_model(), Err(ConfigError::UnknownModel(_))));

        config.components.command_model = "sora".into();
        config.models.get_mut("sora").unwrap().api_key.clear();
        assert!(matches!(
            config.active_model(),
            Err(ConfigError::InvalidModel { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_model_summaries() {
        let file = write_toml(SAMPLE);
        let config = VideoGenConfig::load(Some(file.path())).unwrap();

        let summaries = config.model_summaries();
        assert_eq!(summaries.len(), 2);

        let seed = &summaries[0];
        assert_eq!(seed.id, "seed");
        assert_eq!(seed.name, "seed");
        assert!(!seed.active);

        let sora = &summaries[1];
        assert!(sora.active);
        assert_eq!(sora.to_string(), "sora: Sora 2 (openai/sora-2) [active]");
    }
}
