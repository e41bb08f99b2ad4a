//! Video delivery to chat destinations.
//!
//! [`DeliveryClient`] posts a video message to the chat transport and
//! classifies the reply; only transient failures are retried.
//! [`ArtifactDispatcher`] decides whether a finished video goes out as a URL
//! or is first downloaded and sent inline.

pub mod classify;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod metrics;

pub use classify::{classify_response, DeliveryReason};
pub use client::{DeliveryAttempt, DeliveryClient};
pub use config::{DeliveryConfig, DownloadConfig, PayloadPolicy};
pub use dispatch::ArtifactDispatcher;
pub use download::ArtifactDownloader;
pub use error::{DeliveryError, DeliveryResult};
