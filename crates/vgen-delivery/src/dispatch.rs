//! URL-or-inline dispatch of finished videos.

use tracing::{info, warn};
use vgen_models::{ArtifactKind, ArtifactRef, Destination};

use crate::client::{DeliveryAttempt, DeliveryClient};
use crate::config::PayloadPolicy;
use crate::download::ArtifactDownloader;
use crate::error::{DeliveryError, DeliveryResult};

/// Chooses how a finished video reaches the destination.
///
/// URLs are sent as-is when allowed. Otherwise, or when a URL send fails and
/// fallback is on, the video is downloaded and sent as `base64://`.
#[derive(Debug, Clone)]
pub struct ArtifactDispatcher {
    client: DeliveryClient,
    downloader: ArtifactDownloader,
    policy: PayloadPolicy,
}

impl ArtifactDispatcher {
    pub fn new(client: DeliveryClient, downloader: ArtifactDownloader, policy: PayloadPolicy) -> Self {
        Self {
            client,
            downloader,
            policy,
        }
    }

    pub async fn dispatch(
        &self,
        destination: &Destination,
        artifact: &ArtifactRef,
    ) -> DeliveryResult<DeliveryAttempt> {
        match artifact.kind() {
            ArtifactKind::Empty => Err(DeliveryError::download_failed("no video reference")),
            ArtifactKind::Inline => self.client.deliver(destination, artifact).await,
            ArtifactKind::Url => {
                if self.policy.allow_url_send {
                    match self.client.deliver(destination, artifact).await {
                        Ok(attempt) => return Ok(attempt),
                        Err(e) if self.policy.url_send_fallback_to_download && e.allows_inline_fallback() => {
                            warn!(
                                destination = %destination,
                                reason = e.reason_code(),
                                "URL send failed, falling back to inline download"
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }

                let inline = self.downloader.download_inline(artifact.as_str()).await?;
                info!(destination = %destination, payload = %inline, "Sending downloaded video inline");
                self.client.deliver(destination, &inline).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeliveryConfig, DownloadConfig};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher(server: &MockServer, policy: PayloadPolicy) -> ArtifactDispatcher {
        let client = DeliveryClient::new(&DeliveryConfig {
            host: server.address().ip().to_string(),
            port: server.address().port(),
            max_attempts: 1,
            base_delay_seconds: 0.01,
            timeout_seconds: 5.0,
        })
        .unwrap();
        let downloader = ArtifactDownloader::new(DownloadConfig {
            max_retries: 0,
            backoff: Duration::from_millis(1),
            max_bytes: policy.max_inline_bytes(),
            ..Default::default()
        })
        .unwrap();
        ArtifactDispatcher::new(client, downloader, policy)
    }

    fn private() -> Destination {
        Destination::Private {
            user_id: "42".into(),
        }
    }

    async fn mount_video(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video".to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_url_sent_directly() {
        let server = MockServer::start().await;
        let url = format!("{}/v.mp4", server.uri());
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"message": [{"data": {"file": url}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        dispatcher(&server, PayloadPolicy::default())
            .dispatch(&private(), &ArtifactRef::url(url.clone()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fallback_to_inline_after_url_failure() {
        let server = MockServer::start().await;
        mount_video(&server).await;
        let url = format!("{}/v.mp4", server.uri());
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"message": [{"data": {"file": url}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed", "retcode": 1200, "message": "video url unreachable"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"message": [{"data": {"file": "base64://dmlkZW8="}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let attempt = dispatcher(&server, PayloadPolicy::default())
            .dispatch(&private(), &ArtifactRef::url(url))
            .await
            .unwrap();
        assert_eq!(attempt.payload, ArtifactKind::Inline);
    }

    #[tokio::test]
    async fn test_no_fallback_on_risk_control() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "failed", "retcode": 120, "message": "risk control"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = dispatcher(&server, PayloadPolicy::default())
            .dispatch(&private(), &ArtifactRef::url(format!("{}/v.mp4", server.uri())))
            .await
            .unwrap_err();
        assert_eq!(err.reason_code(), "risk_control");
    }

    #[tokio::test]
    async fn test_url_send_disabled_downloads_first() {
        let server = MockServer::start().await;
        mount_video(&server).await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"message": [{"data": {"file": "base64://dmlkZW8="}}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let policy = PayloadPolicy {
            allow_url_send: false,
            ..Default::default()
        };
        dispatcher(&server, policy)
            .dispatch(&private(), &ArtifactRef::url(format!("{}/v.mp4", server.uri())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_artifact_rejected() {
        let server = MockServer::start().await;
        let err = dispatcher(&server, PayloadPolicy::default())
            .dispatch(&private(), &ArtifactRef::empty())
            .await
            .unwrap_err();
        assert_eq!(err.reason_code(), "download_failed");
    }
}
