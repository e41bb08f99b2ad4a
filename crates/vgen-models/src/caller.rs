//! Caller identity and delivery destinations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the user issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a finished video is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Destination {
    /// Direct message to a user
    Private { user_id: String },
    /// Message to a group
    Group { group_id: String },
}

impl Destination {
    pub fn kind(&self) -> &'static str {
        match self {
            Destination::Private { .. } => "private",
            Destination::Group { .. } => "group",
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            Destination::Private { user_id } => user_id,
            Destination::Group { group_id } => group_id,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.target_id())
    }
}

/// Conversation context of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub caller: CallerId,
    /// Present when the request came from a group conversation
    pub group_id: Option<String>,
}

impl CallerContext {
    pub fn private(user_id: impl Into<String>) -> Self {
        Self {
            caller: CallerId::new(user_id),
            group_id: None,
        }
    }

    pub fn group(user_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            caller: CallerId::new(user_id),
            group_id: Some(group_id.into()),
        }
    }

    /// Group conversations deliver to the group, everything else to the user.
    pub fn destination(&self) -> Destination {
        match &self.group_id {
            Some(group_id) if !group_id.is_empty() => Destination::Group {
                group_id: group_id.clone(),
            },
            _ => Destination::Private {
                user_id: self.caller.0.clone(),
            },
        }
    }
}
