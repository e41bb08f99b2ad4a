//! Artifact URL extraction.
//!
//! Providers report the finished video URL in different places. Extraction is
//! an ordered list of strategies; the first one yielding a non-empty string
//! wins. No match yields an empty [`ArtifactRef`].

use serde_json::Value;
use vgen_models::ArtifactRef;

/// One place an artifact URL may live in a poll response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `{ "<field>": "..." }`
    TopLevel(&'static str),
    /// `{ "<object>": { "<field>": "..." } }`
    Nested {
        object: &'static str,
        field: &'static str,
    },
    /// `{ "<container>": { "<list>": [ { "<field>": "..." } ] } }`
    FirstListItem {
        container: &'static str,
        list: &'static str,
        field: &'static str,
    },
}

/// Precedence used by every built-in adapter.
pub const DEFAULT_STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy::TopLevel("video_url"),
    ExtractionStrategy::Nested {
        object: "content",
        field: "video_url",
    },
    ExtractionStrategy::FirstListItem {
        container: "results",
        list: "videos",
        field: "url",
    },
];

impl ExtractionStrategy {
    pub fn extract<'a>(&self, body: &'a Value) -> Option<&'a str> {
        let found = match *self {
            ExtractionStrategy::TopLevel(field) => body.get(field),
            ExtractionStrategy::Nested { object, field } => {
                body.get(object).filter(|v| v.is_object()).and_then(|o| o.get(field))
            }
            ExtractionStrategy::FirstListItem {
                container,
                list,
                field,
            } => body
                .get(container)
                .and_then(|c| c.get(list))
                .and_then(Value::as_array)
                .and_then(|items| items.first())
                .and_then(|item| item.get(field)),
        };

        found.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
    }
}

/// Run `strategies` in order against `body`.
pub fn extract_artifact(body: &Value, strategies: &[ExtractionStrategy]) -> ArtifactRef {
    strategies
        .iter()
        .find_map(|strategy| strategy.extract(body))
        .map(ArtifactRef::url)
        .unwrap_or_else(ArtifactRef::empty)
}
