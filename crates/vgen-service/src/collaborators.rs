//! Seams to the chat platform.
//!
//! The service never talks to the chat platform directly for anything other
//! than video delivery. Image lookup, image hosting and user-facing text go
//! through these traits so hosts can plug in their own implementations.

use async_trait::async_trait;
use tracing::info;

/// Finds the image a caller recently posted, as raw base64.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn recent_image(&self) -> Option<String>;
}

/// Uploads a base64 image and returns a URL the provider can fetch.
///
/// Returning `None` makes the service fall back to sending the image inline.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, base64: &str) -> Option<String>;
}

/// Sends progress and result text to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str);
}

/// Image source that never has an image.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImage;

#[async_trait]
impl ImageSource for NoImage {
    async fn recent_image(&self) -> Option<String> {
        None
    }
}

/// Image source that always returns the same image.
#[derive(Debug, Clone)]
pub struct StaticImage(pub String);

#[async_trait]
impl ImageSource for StaticImage {
    async fn recent_image(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Notifier that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        info!(target: "vgen::notify", "{}", text);
    }
}
