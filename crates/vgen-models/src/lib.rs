//! Shared data models for the video generation pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Provider profiles and wire format tags
//! - Generation requests and input images
//! - In-flight job records with forward-only status
//! - Artifact references and delivery destinations

pub mod artifact;
pub mod caller;
pub mod job;
pub mod profile;
pub mod request;

// Re-export common types
pub use artifact::{ArtifactKind, ArtifactRef, INLINE_PREFIX};
pub use caller::{CallerContext, CallerId, Destination};
pub use job::{InvalidTransition, Job, JobId, JobStatus};
pub use profile::{ProviderFormat, ProviderProfile, SupportOption};
pub use request::{GenerationRequest, InputImage, VideoShape};
