//! Fetchers: read one list, snapshot it, and report what happened.

use log::{error, info};
use serde::Serialize;
use std::future::Future;

use crate::backend::{BackendError, SourceBackend, SourceTask, TrackerBackend, TrackerTask};
use crate::backup::BackupWriter;
use crate::constants::{
    BACKUP_HABITICA, BACKUP_HABITICA_DONE, BACKUP_NOTION, LOG_ERROR_FETCH_HABITICA, LOG_ERROR_FETCH_HABITICA_DONE,
    LOG_ERROR_FETCH_NOTION,
};

/// Result of fetching one remote list.
///
/// Keeps "the service has no tasks" apart from "the service could not be read".
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(Vec<T>),
    Empty,
    Failed(String),
}

impl<T> FetchOutcome<T> {
    pub fn from_result(result: Result<Vec<T>, BackendError>) -> Self {
        match result {
            Ok(items) if items.is_empty() => Self::Empty,
            Ok(items) => Self::Fetched(items),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fetched(items) => items.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fetched items; empty for `Empty` and `Failed`.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Fetched(items) => items,
            Self::Empty | Self::Failed(_) => Vec::new(),
        }
    }
}

async fn fetch_list<T, F>(what: &str, failure_message: &str, backup: &BackupWriter, file: &str, fut: F) -> FetchOutcome<T>
where
    T: Serialize,
    F: Future<Output = Result<Vec<T>, BackendError>>,
{
    let outcome = FetchOutcome::from_result(fut.await);
    match &outcome {
        FetchOutcome::Fetched(items) => {
            info!("✅ Fetched {} {}", items.len(), what);
            backup.write(file, items);
        }
        FetchOutcome::Empty => {
            info!("✅ Fetched 0 {}", what);
            backup.write(file, &Vec::<T>::new());
        }
        FetchOutcome::Failed(reason) => error!("{}: {}", failure_message, reason),
    }
    outcome
}

/// Every task of the Notion database.
pub async fn fetch_source_tasks(source: &dyn SourceBackend, backup: &BackupWriter) -> FetchOutcome<SourceTask> {
    fetch_list("Notion tasks", LOG_ERROR_FETCH_NOTION, backup, BACKUP_NOTION, source.fetch_tasks()).await
}

/// Open Habitica to-dos.
pub async fn fetch_open_tracker_tasks(tracker: &dyn TrackerBackend, backup: &BackupWriter) -> FetchOutcome<TrackerTask> {
    fetch_list(
        "open Habitica to-dos",
        LOG_ERROR_FETCH_HABITICA,
        backup,
        BACKUP_HABITICA,
        tracker.fetch_open_tasks(),
    )
    .await
}

/// Completed Habitica to-dos.
pub async fn fetch_completed_tracker_tasks(
    tracker: &dyn TrackerBackend,
    backup: &BackupWriter,
) -> FetchOutcome<TrackerTask> {
    fetch_list(
        "completed Habitica to-dos",
        LOG_ERROR_FETCH_HABITICA_DONE,
        backup,
        BACKUP_HABITICA_DONE,
        tracker.fetch_completed_tasks(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_distinguishes_empty_from_failed() {
        let empty: FetchOutcome<u8> = FetchOutcome::from_result(Ok(vec![]));
        assert_eq!(empty, FetchOutcome::Empty);
        assert!(!empty.is_failed());

        let failed: FetchOutcome<u8> = FetchOutcome::from_result(Err(BackendError::Network("timed out".to_string())));
        assert!(failed.is_failed());
        assert_eq!(failed.failure(), Some("Network error: timed out"));
        assert!(failed.into_items().is_empty());

        let fetched = FetchOutcome::from_result(Ok(vec![1u8, 2]));
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched.into_items(), vec![1, 2]);
    }
}
