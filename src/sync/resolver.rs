//! Decides which mutations bring Habitica in line with a Notion task.

use std::fmt;

use crate::backend::{CreateTodoArgs, Priority, SourceTask, TaskStatus, TrackerTask};

/// A single remote write.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncAction {
    /// Create a Habitica to-do for a Notion task that has none.
    Create(CreateTodoArgs),
    /// Overwrite the to-do text.
    Rename { task_id: String, text: String },
    /// Score the to-do up, completing it.
    Score { task_id: String },
    /// Delete the to-do.
    Delete { task_id: String },
    /// Set the Notion task status to Done.
    CompleteSource { source_id: String },
}

impl SyncAction {
    /// Short name used in logs and reports.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Create(_) => ActionKind::Create,
            Self::Rename { .. } => ActionKind::Rename,
            Self::Score { .. } => ActionKind::Score,
            Self::Delete { .. } => ActionKind::Delete,
            Self::CompleteSource { .. } => ActionKind::CompleteSource,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Create,
    Rename,
    Score,
    Delete,
    CompleteSource,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Rename => "rename",
            Self::Score => "score",
            Self::Delete => "delete",
            Self::CompleteSource => "complete-source",
        })
    }
}

/// Habitica text for a Notion task: `"<NAME> ***(<STATUS>)***"`.
pub fn compose_name(task: &SourceTask) -> String {
    format!("{} ***({})***", task.name, task.status).to_uppercase()
}

/// Actions mirroring one Notion task onto Habitica.
///
/// A matched to-do is always renamed, even when the text is unchanged. The Done and
/// Archived/Canceled checks are evaluated after the rename, in that order.
pub fn resolve(source: &SourceTask, counterpart: Option<&TrackerTask>) -> Vec<SyncAction> {
    let Some(tracker) = counterpart else {
        if !source.status.is_active() {
            return Vec::new();
        }
        return vec![SyncAction::Create(CreateTodoArgs {
            text: compose_name(source),
            alias: source.alias(),
            priority: Priority::habitica_weight(source.priority),
        })];
    };

    let mut actions = vec![SyncAction::Rename {
        task_id: tracker.id.clone(),
        text: compose_name(source),
    }];

    if source.status == TaskStatus::Done && !tracker.done {
        actions.push(SyncAction::Score {
            task_id: tracker.id.clone(),
        });
    }

    if source.status.is_removed() {
        actions.push(SyncAction::Delete {
            task_id: tracker.id.clone(),
        });
    }

    actions
}

/// Reverse direction: a Notion task that is not Done but whose to-do was completed.
///
/// `completed` must be looked up in the completed to-do list only.
pub fn resolve_reverse(source: &SourceTask, completed: Option<&TrackerTask>) -> Option<SyncAction> {
    if source.status == TaskStatus::Done {
        return None;
    }
    completed.map(|_| SyncAction::CompleteSource {
        source_id: source.id.clone(),
    })
}
