//! Single-worker mutation queue.
//!
//! Every remote write of a sync cycle goes through one worker task, so writes are
//! issued strictly one after another in the order they were enqueued. A failed
//! write is logged and counted; the worker carries on with the next one.

use anyhow::{Context, Result};
use log::{error, info};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::resolver::{ActionKind, SyncAction};
use crate::backend::{BackendError, SourceBackend, TrackerBackend};

/// Capacity of the channel between the planner and the worker.
const QUEUE_CAPACITY: usize = 64;

/// Per-kind outcome counts of a drained queue.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub succeeded: BTreeMap<ActionKind, usize>,
    pub failed: BTreeMap<ActionKind, usize>,
}

impl ExecutionReport {
    fn record(&mut self, kind: ActionKind, ok: bool) {
        let counts = if ok { &mut self.succeeded } else { &mut self.failed };
        *counts.entry(kind).or_default() += 1;
    }

    pub fn succeeded(&self, kind: ActionKind) -> usize {
        self.succeeded.get(&kind).copied().unwrap_or(0)
    }

    pub fn failed(&self, kind: ActionKind) -> usize {
        self.failed.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_succeeded(&self) -> usize {
        self.succeeded.values().sum()
    }

    pub fn total_failed(&self) -> usize {
        self.failed.values().sum()
    }

    pub fn merge(&mut self, other: ExecutionReport) {
        for (kind, n) in other.succeeded {
            *self.succeeded.entry(kind).or_default() += n;
        }
        for (kind, n) in other.failed {
            *self.failed.entry(kind).or_default() += n;
        }
    }
}

/// Handle to a running mutation worker.
pub struct MutationQueue {
    sender: mpsc::Sender<SyncAction>,
    worker: JoinHandle<ExecutionReport>,
}

impl MutationQueue {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(source: Arc<dyn SourceBackend>, tracker: Arc<dyn TrackerBackend>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<SyncAction>(QUEUE_CAPACITY);

        let worker = tokio::spawn(async move {
            let mut report = ExecutionReport::default();
            while let Some(action) = receiver.recv().await {
                let kind = action.kind();
                let result = execute(&action, source.as_ref(), tracker.as_ref()).await;
                if let Err(e) = &result {
                    error!("❌ Failed to {} ({}): {}", kind, describe(&action), e);
                }
                report.record(kind, result.is_ok());
            }
            report
        });

        Self { sender, worker }
    }

    /// Queue an action behind every action queued before it.
    pub async fn enqueue(&self, action: SyncAction) -> Result<()> {
        self.sender
            .send(action)
            .await
            .map_err(|_| anyhow::anyhow!("Mutation worker stopped unexpectedly"))
    }

    /// Close the queue, wait for every queued action, and return the counts.
    pub async fn finish(self) -> Result<ExecutionReport> {
        drop(self.sender);
        self.worker.await.context("Mutation worker panicked")
    }
}

fn describe(action: &SyncAction) -> String {
    match action {
        SyncAction::Create(args) => format!("'{}'", args.text),
        SyncAction::Rename { task_id, .. } | SyncAction::Score { task_id } | SyncAction::Delete { task_id } => {
            format!("Habitica task '{}'", task_id)
        }
        SyncAction::CompleteSource { source_id } => format!("Notion task '{}'", source_id),
    }
}

async fn execute(
    action: &SyncAction,
    source: &dyn SourceBackend,
    tracker: &dyn TrackerBackend,
) -> Result<(), BackendError> {
    match action {
        SyncAction::Create(args) => {
            tracker.create_task(args.clone()).await?;
            info!("✅ Task '{}' created in Habitica", args.text);
        }
        SyncAction::Rename { task_id, text } => {
            tracker.rename_task(task_id, text).await?;
            info!("✅ Name for task '{}' updated in Habitica", task_id);
        }
        SyncAction::Score { task_id } => {
            tracker.score_task(task_id).await?;
            info!("✅ Task '{}' scored in Habitica", task_id);
        }
        SyncAction::Delete { task_id } => {
            tracker.delete_task(task_id).await?;
            info!("✅ Task '{}' deleted from Habitica", task_id);
        }
        SyncAction::CompleteSource { source_id } => {
            source.mark_done(source_id).await?;
            info!("✅ Task '{}' marked Done in Notion", source_id);
        }
    }
    Ok(())
}
