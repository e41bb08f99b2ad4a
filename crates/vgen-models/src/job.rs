//! In-flight job records.
//!
//! A [`Job`] exists only for the duration of one orchestrator call and is
//! never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::profile::ProviderFormat;

/// Local identifier for a job, used for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempted to move a job out of a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Mutable record for one in-flight generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Identifier assigned by the provider at submit time
    pub provider_job_id: String,
    pub provider: ProviderFormat,
    status: JobStatus,
    pub started_at: DateTime<Utc>,
    /// Submit attempts including the successful one
    pub submit_attempts: u32,
    /// Poll calls issued so far
    pub poll_attempts: u32,
}

impl Job {
    /// Create a pending job after a successful submission.
    pub fn new(
        id: JobId,
        provider_job_id: impl Into<String>,
        provider: ProviderFormat,
        submit_attempts: u32,
    ) -> Self {
        Self {
            id,
            provider_job_id: provider_job_id.into(),
            provider,
            status: JobStatus::Pending,
            started_at: Utc::now(),
            submit_attempts,
            poll_attempts: 0,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn record_poll(&mut self) {
        self.poll_attempts += 1;
    }

    pub fn succeed(&mut self) -> Result<(), InvalidTransition> {
        self.transition(JobStatus::Succeeded)
    }

    pub fn fail(&mut self) -> Result<(), InvalidTransition> {
        self.transition(JobStatus::Failed)
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), InvalidTransition> {
        if self.status != JobStatus::Pending {
            return Err(InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
