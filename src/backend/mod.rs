//! Backend abstraction layer for the two synchronized services.
//!
//! This module defines the interfaces the sync engine talks to, the normalized
//! task shapes both services are mapped into, and common error handling.
//! Notion is the source of truth for task status; Habitica mirrors it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    ALIAS_PREFIX, STATUS_ARCHIVED, STATUS_BACKLOG, STATUS_CANCELED, STATUS_DONE, STATUS_IN_PROGRESS, STATUS_TODO,
};

pub mod factory;
pub mod habitica;
pub mod notion;

/// Common error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Backend error: {0}")]
    Other(String),
}

impl BackendError {
    /// Map a non-success HTTP status and its body into an error.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth(format!("{status}: {body}")),
            404 => Self::NotFound(format!("{status}: {body}")),
            _ => Self::Other(format!("{status}: {body}")),
        }
    }
}

/// Turn a non-success response into a `BackendError`, keeping the body for context.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::from_status(status, &body))
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidData(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Status of a Notion task.
///
/// Labels are matched case-insensitively; anything outside the known vocabulary
/// is kept verbatim as `Other`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    ToDo,
    Backlog,
    InProgress,
    Done,
    Archived,
    Canceled,
    Other(String),
}

impl TaskStatus {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        let known = [
            (STATUS_TODO, Self::ToDo),
            (STATUS_BACKLOG, Self::Backlog),
            (STATUS_IN_PROGRESS, Self::InProgress),
            (STATUS_DONE, Self::Done),
            (STATUS_ARCHIVED, Self::Archived),
            (STATUS_CANCELED, Self::Canceled),
        ];
        known
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, status)| status)
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }

    /// Canonical Notion label for this status.
    pub fn label(&self) -> &str {
        match self {
            Self::ToDo => STATUS_TODO,
            Self::Backlog => STATUS_BACKLOG,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Done => STATUS_DONE,
            Self::Archived => STATUS_ARCHIVED,
            Self::Canceled => STATUS_CANCELED,
            Self::Other(label) => label,
        }
    }

    /// Statuses that get a Habitica to-do created when none exists yet.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ToDo | Self::Backlog | Self::InProgress)
    }

    /// Statuses that remove the Habitica counterpart.
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Archived | Self::Canceled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Priority select value of a Notion task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Parse a select option name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }

    /// Habitica difficulty for an optional priority.
    ///
    /// Habitica accepts 0.1, 1, 1.5 and 2; unset priorities are "easy".
    pub fn habitica_weight(priority: Option<Self>) -> f32 {
        match priority {
            Some(Self::Low) | None => 1.0,
            Some(Self::Medium) => 1.5,
            Some(Self::High) => 2.0,
        }
    }
}

/// A task row of the Notion database, normalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceTask {
    pub id: String,
    pub name: String,
    pub priority: Option<Priority>,
    pub status: TaskStatus,
}

impl SourceTask {
    /// Alias the Habitica counterpart of this task carries.
    pub fn alias(&self) -> String {
        format!("{ALIAS_PREFIX}{}", self.id)
    }
}

/// A Habitica to-do, normalized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerTask {
    pub id: String,
    pub name: String,
    /// Empty when the to-do was not created by this tool.
    pub alias: String,
    pub done: bool,
}

/// Arguments for creating a Habitica to-do.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateTodoArgs {
    pub text: String,
    pub alias: String,
    pub priority: f32,
}

/// Read and write access to the Notion database.
#[async_trait]
pub trait SourceBackend: Send + Sync {
    /// Fetch every task of the configured database.
    async fn fetch_tasks(&self) -> Result<Vec<SourceTask>, BackendError>;

    /// Set the status of a task to Done.
    async fn mark_done(&self, remote_id: &str) -> Result<(), BackendError>;
}

/// Read and write access to the Habitica to-do list.
#[async_trait]
pub trait TrackerBackend: Send + Sync {
    async fn fetch_open_tasks(&self) -> Result<Vec<TrackerTask>, BackendError>;
    async fn fetch_completed_tasks(&self) -> Result<Vec<TrackerTask>, BackendError>;

    async fn create_task(&self, args: CreateTodoArgs) -> Result<(), BackendError>;
    async fn rename_task(&self, remote_id: &str, text: &str) -> Result<(), BackendError>;
    /// Score a to-do up, which completes it.
    async fn score_task(&self, remote_id: &str) -> Result<(), BackendError>;
    async fn delete_task(&self, remote_id: &str) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_parse_case_insensitively() {
        assert_eq!(TaskStatus::from_label("To Do"), TaskStatus::ToDo);
        assert_eq!(TaskStatus::from_label("Backlog"), TaskStatus::Backlog);
        assert_eq!(TaskStatus::from_label("In Progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::from_label("done"), TaskStatus::Done);
        assert_eq!(TaskStatus::from_label("Waiting"), TaskStatus::Other("Waiting".to_string()));
        assert_eq!(TaskStatus::Other("Waiting".to_string()).label(), "Waiting");
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(Priority::habitica_weight(Priority::from_name("Low")), 1.0);
        assert_eq!(Priority::habitica_weight(Priority::from_name("Medium")), 1.5);
        assert_eq!(Priority::habitica_weight(Priority::from_name("High")), 2.0);
        assert_eq!(Priority::habitica_weight(Priority::from_name("Urgent")), 1.0);
        assert_eq!(Priority::habitica_weight(None), 1.0);
    }

    #[test]
    fn test_error_from_status() {
        let err = BackendError::from_status(reqwest::StatusCode::UNAUTHORIZED, "bad token");
        assert!(matches!(err, BackendError::Auth(_)));
        let err = BackendError::from_status(reqwest::StatusCode::NOT_FOUND, "");
        assert!(matches!(err, BackendError::NotFound(_)));
        let err = BackendError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, BackendError::Other(_)));
    }
}
