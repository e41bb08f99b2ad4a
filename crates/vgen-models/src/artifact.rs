//! Artifact references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix marking an inline base64 payload.
pub const INLINE_PREFIX: &str = "base64://";

/// What an [`ArtifactRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Url,
    Inline,
    Empty,
}

/// Reference to a finished video: a remote URL or an inline `base64://` payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Wrap a raw base64 payload.
    pub fn inline(base64: &str) -> Self {
        Self(format!("{}{}", INLINE_PREFIX, base64))
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn kind(&self) -> ArtifactKind {
        if self.0.trim().is_empty() {
            ArtifactKind::Empty
        } else if self.0.starts_with(INLINE_PREFIX) {
            ArtifactKind::Inline
        } else {
            ArtifactKind::Url
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind() == ArtifactKind::Empty
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short description for logs, never the full inline payload.
    pub fn describe(&self) -> String {
        match self.kind() {
            ArtifactKind::Url => self.0.clone(),
            ArtifactKind::Inline => format!("inline payload ({} bytes)", self.0.len() - INLINE_PREFIX.len()),
            ArtifactKind::Empty => "empty artifact".to_string(),
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
