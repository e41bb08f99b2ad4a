//! Download a finished video and encode it for inline sending.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use vgen_models::ArtifactRef;

use crate::config::DownloadConfig;
use crate::error::{DeliveryError, DeliveryResult};

const MB: f64 = 1024.0 * 1024.0;

/// Fetches video URLs into `base64://` artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactDownloader {
    http: Client,
    config: DownloadConfig,
}

impl ArtifactDownloader {
    pub fn new(config: DownloadConfig) -> DeliveryResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout);
        if let Some(url) = &config.proxy {
            debug!(proxy = %url, "Video downloads use proxy");
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| DeliveryError::Config(format!("invalid proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| DeliveryError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn too_large(&self, bytes: u64) -> DeliveryError {
        DeliveryError::TooLarge {
            size_mb: bytes as f64 / MB,
            limit_mb: self.config.max_bytes / (1024 * 1024),
        }
    }

    /// Download `url` and return it as an inline artifact.
    ///
    /// 5xx responses and connection errors are retried; anything over the
    /// size limit is rejected without reading the rest of the body.
    pub async fn download_inline(&self, url: &str) -> DeliveryResult<ArtifactRef> {
        let mut attempt = 0u32;

        loop {
            match self.fetch(url).await {
                Ok(bytes) => {
                    debug!(bytes = bytes.len(), "Video downloaded");
                    return Ok(ArtifactRef::inline(&STANDARD.encode(&bytes)));
                }
                Err(Fetch::Retry(reason)) if attempt < self.config.max_retries => {
                    let delay = self
                        .config
                        .backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Video download failed, retrying: {}", reason
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Fetch::Retry(reason)) => return Err(DeliveryError::download_failed(reason)),
                Err(Fetch::Fatal(err)) => return Err(err),
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Fetch> {
        let mut response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Fetch::Retry("download timed out".to_string())
            } else {
                Fetch::Retry(format!("connection failed: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Fetch::Retry(format!("HTTP {}", status.as_u16())));
        }
        if status != StatusCode::OK {
            return Err(Fetch::Fatal(DeliveryError::download_failed(format!(
                "HTTP {}",
                status.as_u16()
            ))));
        }

        if let Some(length) = response.content_length() {
            if length > self.config.max_bytes {
                return Err(Fetch::Fatal(self.too_large(length)));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Fetch::Retry(format!("read failed: {}", e)))?
        {
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > self.config.max_bytes {
                return Err(Fetch::Fatal(self.too_large(bytes.len() as u64)));
            }
        }

        if bytes.is_empty() {
            return Err(Fetch::Fatal(DeliveryError::download_failed("empty response body")));
        }

        Ok(bytes)
    }
}

enum Fetch {
    Retry(String),
    Fatal(DeliveryError),
}
