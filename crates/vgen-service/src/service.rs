//! End-to-end handling of one video command.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span, warn, Instrument};
use vgen_delivery::{ArtifactDispatcher, ArtifactDownloader, DeliveryClient};
use vgen_gate::ConcurrencyGate;
use vgen_models::{ArtifactRef, CallerContext, GenerationRequest, InputImage, VideoShape};
use vgen_orchestrator::JobOrchestrator;
use vgen_providers::apply_shape;

use crate::collaborators::{ImageSource, ImageUploader, Notifier};
use crate::config::VideoGenConfig;
use crate::error::{ServiceError, ServiceResult};

const BUSY_TEXT: &str = "Other videos are being generated, your request is queued";
const DONE_TEXT: &str = "Video generation complete!";

/// A parsed video command.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCommand {
    pub caller: CallerContext,
    pub prompt: String,
    pub shape: VideoShape,
}

impl VideoCommand {
    pub fn new(caller: CallerContext, prompt: impl Into<String>) -> Self {
        Self {
            caller,
            prompt: prompt.into(),
            shape: VideoShape::Default,
        }
    }

    pub fn with_shape(mut self, shape: VideoShape) -> Self {
        self.shape = shape;
        self
    }
}

/// What the caller is told once a command finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOutcome {
    pub success: bool,
    pub message: String,
    pub reason_code: &'static str,
    pub artifact: Option<ArtifactRef>,
}

impl ServiceOutcome {
    fn delivered(artifact: ArtifactRef) -> Self {
        Self {
            success: true,
            message: DONE_TEXT.to_string(),
            reason_code: "ok",
            artifact: Some(artifact),
        }
    }

    fn failed(err: &ServiceError) -> Self {
        Self {
            success: false,
            message: err.user_message(),
            reason_code: err.reason_code(),
            artifact: None,
        }
    }
}

/// Runs video commands: validation, admission, generation and delivery.
pub struct VideoService {
    config: VideoGenConfig,
    gate: ConcurrencyGate,
    orchestrator: JobOrchestrator,
    dispatcher: ArtifactDispatcher,
    uploader: Option<Arc<dyn ImageUploader>>,
}

impl VideoService {
    pub fn new(config: VideoGenConfig) -> ServiceResult<Self> {
        let gate = ConcurrencyGate::new(config.gate_config());
        let orchestrator = JobOrchestrator::new(&config.orchestrator_config())?;
        let dispatcher = ArtifactDispatcher::new(
            DeliveryClient::new(&config.delivery)?,
            ArtifactDownloader::new(config.download_config())?,
            config.payload_policy(),
        );

        Ok(Self {
            config,
            gate,
            orchestrator,
            dispatcher,
            uploader: None,
        })
    }

    /// Host input images through `uploader` when `image_uploader.enabled`.
    pub fn with_uploader(mut self, uploader: Arc<dyn ImageUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn config(&self) -> &VideoGenConfig {
        &self.config
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    pub fn orchestrator(&self) -> &JobOrchestrator {
        &self.orchestrator
    }

    /// Handle one command and report the result through `notifier`.
    pub async fn handle(
        &self,
        command: &VideoCommand,
        images: &dyn ImageSource,
        notifier: &dyn Notifier,
    ) -> ServiceOutcome {
        let span = info_span!(
            "video_command",
            caller = %command.caller.caller,
            destination = %command.caller.destination(),
        );

        async {
            let started = Instant::now();
            match self.run(command, images, notifier).await {
                Ok(artifact) => {
                    info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        video = %artifact.describe(),
                        "Video command completed"
                    );
                    notifier.notify(DONE_TEXT).await;
                    ServiceOutcome::delivered(artifact)
                }
                Err(e) => {
                    warn!(
                        reason = e.reason_code(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Video command failed: {}", e
                    );
                    let outcome = ServiceOutcome::failed(&e);
                    notifier.notify(&outcome.message).await;
                    outcome
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        command: &VideoCommand,
        images: &dyn ImageSource,
        notifier: &dyn Notifier,
    ) -> ServiceResult<ArtifactRef> {
        let request = self.prepare(command, images, notifier).await?;

        let admission = self.gate.enter(&command.caller.caller)?;
        if admission.is_queued() {
            notifier.notify(BUSY_TEXT).await;
        }
        // Held through delivery
        let _slot = admission.wait().await?;

        notifier
            .notify(if request.is_image_to_video() {
                "Starting image-to-video generation, please wait..."
            } else {
                "Starting text-to-video generation, please wait..."
            })
            .await;

        let artifact = self.orchestrator.submit_and_wait(&request).await?;
        self.dispatcher
            .dispatch(&command.caller.destination(), &artifact)
            .await?;

        Ok(artifact)
    }

    /// Build the provider request. Nothing here touches the gate or a provider.
    async fn prepare(
        &self,
        command: &VideoCommand,
        images: &dyn ImageSource,
        notifier: &dyn Notifier,
    ) -> ServiceResult<GenerationRequest> {
        let (model_id, profile) = self.config.active_model()?;
        if self.config.components.enable_debug_info {
            notifier
                .notify(&format!(
                    "Using model {} ({}/{})",
                    model_id,
                    profile.format,
                    profile.effective_model()
                ))
                .await;
        }

        let prompt = self.validate_prompt(&command.prompt)?;
        let profile = apply_shape(profile, command.shape);

        let image = images.recent_image().await.filter(|b64| !b64.is_empty());
        match &image {
            Some(_) if !profile.support_option.allows_image() => {
                return Err(ServiceError::rejected(
                    "The current model does not support image-to-video",
                ));
            }
            None if !profile.support_option.allows_text() => {
                return Err(ServiceError::rejected(
                    "The current model does not support text-to-video, please send an image",
                ));
            }
            _ => {}
        }

        let mut request = GenerationRequest::new(prompt, profile).with_provider_id(model_id);
        if let Some(b64) = image {
            request = request.with_image(self.host_image(b64).await);
        }

        Ok(request)
    }

    fn validate_prompt(&self, prompt: &str) -> ServiceResult<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ServiceError::rejected("Please describe the video you want"));
        }

        let max = self.config.video.max_prompt_length;
        let length = prompt.chars().count();
        if max > 0 && length > max {
            return Err(ServiceError::rejected(format!(
                "Prompt is too long ({} characters, at most {})",
                length, max
            )));
        }

        Ok(prompt.to_string())
    }

    /// Upload the image when hosting is on, else send it inline.
    async fn host_image(&self, b64: String) -> InputImage {
        if self.config.image_uploader.enabled {
            if let Some(uploader) = &self.uploader {
                match uploader.upload(&b64).await {
                    Some(url) if !url.is_empty() => return InputImage::Url(url),
                    _ => warn!("Image upload failed, sending image inline"),
                }
            }
        }
        InputImage::Inline(b64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{NoImage, StaticImage};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use vgen_models::{CallerId, ProviderFormat, ProviderProfile, SupportOption};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingNotifier(Mutex<Vec<String>>);

    impl RecordingNotifier {
        fn texts(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    struct FixedUploader(Option<String>);

    #[async_trait]
    impl ImageUploader for FixedUploader {
        async fn upload(&self, _base64: &str) -> Option<String> {
            self.0.clone()
        }
    }

    fn config(server: &MockServer) -> VideoGenConfig {
        let mut config = VideoGenConfig::default();
        config.api.poll_interval_seconds = 0.01;
        config.api.submit_backoff_seconds = 0.01;
        config.api.request_timeout_seconds = 5.0;
        config.delivery.host = server.address().ip().to_string();
        config.delivery.port = server.address().port();
        config.delivery.base_delay_seconds = 0.01;
        config.models.insert(
            "model1".into(),
            ProviderProfile::new(ProviderFormat::OpenAi, server.uri(), "sk-test"),
        );
        config
    }

    fn command(prompt: &str) -> VideoCommand {
        VideoCommand::new(CallerContext::group("10001", "555"), prompt)
    }

    async fn mount_provider(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "vid-1"})))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos/vid-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "completed", "video_url": "https://cdn.test/v.mp4"
            })))
            .mount(server)
            .await;
    }

    async fn mount_delivery_ok(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/send_group_msg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_text_to_video_end_to_end() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        Mock::given(method("POST"))
            .and(path("/send_group_msg"))
            .and(body_partial_json(json!({
                "group_id": "555",
                "message": [{"type": "video", "data": {"file": "https://cdn.test/v.mp4"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let service = VideoService::new(config(&server)).unwrap();
        let notes = RecordingNotifier::default();
        let outcome = service.handle(&command("a cat surfing"), &NoImage, &notes).await;

        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(outcome.reason_code, "ok");
        assert_eq!(outcome.artifact, Some(ArtifactRef::url("https://cdn.test/v.mp4")));
        assert_eq!(
            notes.texts(),
            vec![
                "Starting text-to-video generation, please wait...".to_string(),
                DONE_TEXT.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_without_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = VideoService::new(config(&server)).unwrap();
        let notes = RecordingNotifier::default();
        let outcome = service.handle(&command("   "), &NoImage, &notes).await;

        assert!(!outcome.success);
        assert_eq!(outcome.reason_code, "invalid_request");
        assert_eq!(notes.texts(), vec![outcome.message]);
    }

    #[tokio::test]
    async fn test_prompt_too_long() {
        let server = MockServer::start().await;
        let mut config = config(&server);
        config.video.max_prompt_length = 5;

        let service = VideoService::new(config).unwrap();
        let outcome = service
            .handle(&command("a long prompt"), &NoImage, &RecordingNotifier::default())
            .await;
        assert_eq!(outcome.reason_code, "invalid_request");
        assert!(outcome.message.contains("at most 5"));
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let server = MockServer::start().await;
        let mut config = config(&server);
        config.components.command_model = "model9".into();

        let service = VideoService::new(config).unwrap();
        let outcome = service
            .handle(&command("cat"), &NoImage, &RecordingNotifier::default())
            .await;
        assert_eq!(outcome.reason_code, "config_error");
        assert_eq!(outcome.message, "Model 'model9' is not configured");
    }

    #[tokio::test]
    async fn test_support_option_mismatch() {
        let server = MockServer::start().await;
        let mut config = config(&server);
        config.models.get_mut("model1").unwrap().support_option = SupportOption::TextOnly;
        let service = VideoService::new(config).unwrap();

        let outcome = service
            .handle(
                &command("cat"),
                &StaticImage("aW1n".into()),
                &RecordingNotifier::default(),
            )
            .await;
        assert_eq!(outcome.reason_code, "invalid_request");
        assert!(outcome.message.contains("image-to-video"));

        let mut config = self::config(&server);
        config.models.get_mut("model1").unwrap().support_option = SupportOption::ImageOnly;
        let service = VideoService::new(config).unwrap();

        let outcome = service
            .handle(&command("cat"), &NoImage, &RecordingNotifier::default())
            .await;
        assert!(outcome.message.contains("text-to-video"));
    }

    #[tokio::test]
    async fn test_uploaded_image_sent_as_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos"))
            .and(body_partial_json(json!({"images": ["https://img.test/1.png"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "vid-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos/vid-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "completed", "video_url": "https://cdn.test/v.mp4"
            })))
            .mount(&server)
            .await;
        mount_delivery_ok(&server).await;

        let mut config = config(&server);
        config.image_uploader.enabled = true;
        let service = VideoService::new(config)
            .unwrap()
            .with_uploader(Arc::new(FixedUploader(Some("https://img.test/1.png".into()))));

        let notes = RecordingNotifier::default();
        let outcome = service
            .handle(&command("animate this"), &StaticImage("aW1n".into()), &notes)
            .await;
        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(
            notes.texts()[0],
            "Starting image-to-video generation, please wait..."
        );
    }

    #[tokio::test]
    async fn test_failed_upload_falls_back_to_inline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos"))
            .and(body_partial_json(json!({"images": ["aW1n"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "vid-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos/vid-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "completed", "video_url": "https://cdn.test/v.mp4"
            })))
            .mount(&server)
            .await;
        mount_delivery_ok(&server).await;

        let mut config = config(&server);
        config.image_uploader.enabled = true;
        let service = VideoService::new(config)
            .unwrap()
            .with_uploader(Arc::new(FixedUploader(None)));

        let outcome = service
            .handle(
                &command("animate this"),
                &StaticImage("aW1n".into()),
                &RecordingNotifier::default(),
            )
            .await;
        assert!(outcome.success, "{:?}", outcome);
    }

    #[tokio::test]
    async fn test_provider_failure_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "vid-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/videos/vid-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed", "error": {"message": "content policy"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/send_group_msg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = VideoService::new(config(&server)).unwrap();
        let notes = RecordingNotifier::default();
        let outcome = service.handle(&command("cat"), &NoImage, &notes).await;

        assert!(!outcome.success);
        assert_eq!(outcome.reason_code, "provider_failure");
        assert_eq!(notes.texts().last(), Some(&outcome.message));
    }

    #[tokio::test]
    async fn test_delivery_failure_reported() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        Mock::given(method("POST"))
            .and(path("/send_group_msg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed", "retcode": 120, "message": "risk control"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = VideoService::new(config(&server)).unwrap();
        let outcome = service
            .handle(&command("cat"), &NoImage, &RecordingNotifier::default())
            .await;
        assert_eq!(outcome.reason_code, "risk_control");
        assert!(outcome.message.starts_with("Video generated but sending failed"));
    }

    #[tokio::test]
    async fn test_rate_limited_second_command() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        mount_delivery_ok(&server).await;

        let mut config = config(&server);
        config.components.max_requests_per_window = 1;
        let service = VideoService::new(config).unwrap();

        let first = service
            .handle(&command("cat"), &NoImage, &RecordingNotifier::default())
            .await;
        assert!(first.success);

        let second = service
            .handle(&command("dog"), &NoImage, &RecordingNotifier::default())
            .await;
        assert_eq!(second.reason_code, "rate_limited");
    }

    #[tokio::test]
    async fn test_busy_signal_then_runs() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        mount_delivery_ok(&server).await;

        let mut config = config(&server);
        config.components.max_requests = 1;
        let service = Arc::new(VideoService::new(config).unwrap());
        let held = service.gate().acquire(&CallerId::new("other")).await.unwrap();

        let notes = Arc::new(RecordingNotifier::default());
        let task = {
            let service = Arc::clone(&service);
            let notes = Arc::clone(&notes);
            tokio::spawn(async move { service.handle(&command("cat"), &NoImage, notes.as_ref()).await })
        };

        for _ in 0..200 {
            if notes.texts().iter().any(|t| t == BUSY_TEXT) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(notes.texts(), vec![BUSY_TEXT.to_string()]);

        drop(held);
        let outcome = task.await.unwrap();
        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(service.gate().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_debug_info_names_model() {
        let server = MockServer::start().await;
        let mut config = config(&server);
        config.components.enable_debug_info = true;

        let service = VideoService::new(config).unwrap();
        let notes = RecordingNotifier::default();
        service.handle(&command(""), &NoImage, &notes).await;
        assert_eq!(notes.texts()[0], "Using model model1 (openai/sora-2)");
    }
}
