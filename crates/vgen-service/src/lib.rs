//! Video generation command service.
//!
//! Ties configuration, admission control, provider orchestration and
//! delivery together behind [`VideoService`]. Chat-platform specifics stay
//! behind the traits in [`collaborators`].

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

pub use collaborators::{ImageSource, ImageUploader, LogNotifier, NoImage, Notifier, StaticImage};
pub use config::{
    ComponentsConfig, ConfigError, ImageUploaderConfig, ModelSummary, VideoConfig, VideoGenConfig,
};
pub use error::{ServiceError, ServiceResult};
pub use service::{ServiceOutcome, VideoCommand, VideoService};
