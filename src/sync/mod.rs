//! Synchronization service module for notion-habitica-sync.
//!
//! This module provides the [`SyncService`] struct which runs sync cycles between
//! the Notion database and the Habitica to-do list. A cycle fetches both sides,
//! matches tasks through the `notion-<id>` alias, resolves the mutations each task
//! needs, and executes them one at a time through a [`MutationQueue`].

pub mod fetch;
pub mod matcher;
pub mod queue;
pub mod resolver;

use anyhow::Result;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::factory;
use crate::backend::{SourceBackend, SourceTask, TaskStatus, TrackerBackend};
use crate::backup::BackupWriter;
use crate::config::{Config, Credentials, SyncConfig};
use crate::constants::{BACKUP_NOTION_PENDING, LOG_SYNC_FORWARD, LOG_SYNC_REVERSE, LOG_SYNC_SKIPPED_IN_PROGRESS, LOG_SYNC_STARTED};

pub use fetch::FetchOutcome;
pub use matcher::{find_counterpart, AliasIndex};
pub use queue::{ExecutionReport, MutationQueue};
pub use resolver::{compose_name, resolve, resolve_reverse, ActionKind, SyncAction};

/// Behaviour switches of a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Run the Habitica → Notion pass after the Notion → Habitica pass
    pub bidirectional: bool,
    /// Abort the cycle when any fetch fails instead of treating the list as empty
    pub skip_on_fetch_failure: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            bidirectional: false,
            skip_on_fetch_failure: true,
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            bidirectional: config.bidirectional,
            skip_on_fetch_failure: config.skip_on_fetch_failure,
        }
    }
}

/// Represents the current status of a synchronization operation.
#[derive(Debug, Clone)]
pub enum SyncStatus {
    /// Another cycle was already running; this trigger was skipped
    InProgress,
    /// The cycle ran to completion; individual writes may still have failed
    Success(SyncStats),
    /// The cycle was skipped before any write was issued
    Error {
        /// Human-readable error message describing what went wrong
        message: String,
    },
}

impl SyncStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Counters of one sync cycle.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub cycle_id: Uuid,
    pub source_tasks: usize,
    pub open_tracker_tasks: usize,
    pub completed_tracker_tasks: usize,
    pub duplicate_aliases: usize,
    pub actions_planned: usize,
    pub execution: ExecutionReport,
}

impl SyncStats {
    fn new(cycle_id: Uuid) -> Self {
        Self {
            cycle_id,
            ..Self::default()
        }
    }
}

enum PassOutcome {
    Completed,
    Skipped(String),
}

/// Service that runs sync cycles between Notion and Habitica.
///
/// Cloning is cheap and clones share the in-progress flag, so a clone handed to
/// the scheduler still refuses to start a cycle while another one is running.
///
/// # Example
/// ```rust,no_run
/// use notion_habitica_sync::config::Config;
/// use notion_habitica_sync::sync::SyncService;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load(None)?;
/// let credentials = config.resolve_credentials()?;
/// let sync_service = SyncService::from_config(&config, &credentials)?;
///
/// let status = sync_service.sync().await?;
/// println!("{status:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncService {
    source: Arc<dyn SourceBackend>,
    tracker: Arc<dyn TrackerBackend>,
    backup: BackupWriter,
    options: SyncOptions,
    sync_in_progress: Arc<Mutex<bool>>,
}

impl SyncService {
    /// Creates a new `SyncService` over the given backends.
    pub fn new(
        source: Arc<dyn SourceBackend>,
        tracker: Arc<dyn TrackerBackend>,
        backup: BackupWriter,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            tracker,
            backup,
            options,
            sync_in_progress: Arc::new(Mutex::new(false)),
        }
    }

    /// Creates a `SyncService` talking to the real Notion and Habitica APIs.
    ///
    /// # Errors
    /// Returns an error if either HTTP client cannot be built
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        Ok(Self::new(
            factory::create_source_backend(config, credentials)?,
            factory::create_tracker_backend(config, credentials)?,
            BackupWriter::new(&config.backup),
            SyncOptions::from(&config.sync),
        ))
    }

    /// Checks if a synchronization operation is currently in progress.
    pub async fn is_syncing(&self) -> bool {
        *self.sync_in_progress.lock().await
    }

    /// Runs one full sync cycle.
    ///
    /// Only one cycle runs at a time: a call made while another cycle is running
    /// returns `SyncStatus::InProgress` without touching either service.
    ///
    /// # Errors
    /// Returns an error only if the mutation worker dies; remote failures are
    /// reported through the returned `SyncStatus` and `SyncStats`.
    pub async fn sync(&self) -> Result<SyncStatus> {
        // Check if sync is already in progress and acquire lock
        let mut sync_guard = self.sync_in_progress.lock().await;
        if *sync_guard {
            warn!("{}", LOG_SYNC_SKIPPED_IN_PROGRESS);
            return Ok(SyncStatus::InProgress);
        }
        *sync_guard = true;

        // Release the lock before performing sync to avoid holding it during the long operation
        drop(sync_guard);

        let result = self.perform_sync().await;

        // Release sync lock
        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            *sync_guard = false;
        }

        result
    }

    /// Internal sync implementation
    async fn perform_sync(&self) -> Result<SyncStatus> {
        let cycle_id = Uuid::new_v4();
        info!("{} (cycle {})", LOG_SYNC_STARTED, cycle_id);

        let mut stats = SyncStats::new(cycle_id);

        if let PassOutcome::Skipped(message) = self.sync_notion_to_habitica(&mut stats).await? {
            return Ok(SyncStatus::Error { message });
        }

        if self.options.bidirectional {
            if let PassOutcome::Skipped(message) = self.sync_habitica_to_notion(&mut stats).await? {
                return Ok(SyncStatus::Error { message });
            }
        }

        info!(
            "✅ Sync cycle {} complete: {} actions planned, {} succeeded, {} failed",
            cycle_id,
            stats.actions_planned,
            stats.execution.total_succeeded(),
            stats.execution.total_failed()
        );

        Ok(SyncStatus::Success(stats))
    }

    /// Decide whether failed fetches abort the pass.
    fn check_fetches(&self, failures: &[Option<&str>]) -> Option<String> {
        let reasons: Vec<&str> = failures.iter().flatten().copied().collect();
        if reasons.is_empty() {
            return None;
        }
        if self.options.skip_on_fetch_failure {
            let message = format!("Skipping sync cycle, fetch failed: {}", reasons.join("; "));
            error!("❌ {message}");
            Some(message)
        } else {
            warn!("⚠️  Continuing with empty lists for failed fetches: {}", reasons.join("; "));
            None
        }
    }

    /// Mirror every Notion task onto Habitica.
    async fn sync_notion_to_habitica(&self, stats: &mut SyncStats) -> Result<PassOutcome> {
        info!("{}", LOG_SYNC_FORWARD);

        let open = fetch::fetch_open_tracker_tasks(self.tracker.as_ref(), &self.backup).await;
        let completed = fetch::fetch_completed_tracker_tasks(self.tracker.as_ref(), &self.backup).await;
        let notion = fetch::fetch_source_tasks(self.source.as_ref(), &self.backup).await;

        if let Some(message) = self.check_fetches(&[open.failure(), completed.failure(), notion.failure()]) {
            return Ok(PassOutcome::Skipped(message));
        }

        stats.open_tracker_tasks = open.len();
        stats.completed_tracker_tasks = completed.len();
        stats.source_tasks = notion.len();

        // Open to-dos first so they take precedence over completed ones on duplicate aliases
        let mut tracker_tasks = open.into_items();
        tracker_tasks.extend(completed.into_items());
        let source_tasks = notion.into_items();

        let index = AliasIndex::build(&tracker_tasks);
        index.warn_duplicates();
        stats.duplicate_aliases = index.duplicates().len();

        let queue = MutationQueue::spawn(self.source.clone(), self.tracker.clone());
        for task in &source_tasks {
            for action in resolve(task, index.get(task)) {
                stats.actions_planned += 1;
                queue.enqueue(action).await?;
            }
        }
        stats.execution.merge(queue.finish().await?);

        Ok(PassOutcome::Completed)
    }

    /// Mark Notion tasks Done when their Habitica to-do was completed.
    async fn sync_habitica_to_notion(&self, stats: &mut SyncStats) -> Result<PassOutcome> {
        info!("{}", LOG_SYNC_REVERSE);

        let completed = fetch::fetch_completed_tracker_tasks(self.tracker.as_ref(), &self.backup).await;
        let notion = fetch::fetch_source_tasks(self.source.as_ref(), &self.backup).await;

        if let Some(message) = self.check_fetches(&[completed.failure(), notion.failure()]) {
            return Ok(PassOutcome::Skipped(message));
        }

        let pending: Vec<SourceTask> = notion
            .into_items()
            .into_iter()
            .filter(|task| task.status != TaskStatus::Done)
            .collect();
        self.backup.write(BACKUP_NOTION_PENDING, &pending);

        let completed_tasks = completed.into_items();
        let index = AliasIndex::build(&completed_tasks);

        let queue = MutationQueue::spawn(self.source.clone(), self.tracker.clone());
        for task in &pending {
            if let Some(action) = resolve_reverse(task, index.get(task)) {
                stats.actions_planned += 1;
                queue.enqueue(action).await?;
            }
        }
        stats.execution.merge(queue.finish().await?);

        Ok(PassOutcome::Completed)
    }
}
