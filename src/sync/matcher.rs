//! Matching Notion tasks to their Habitica counterparts through the alias convention.

use log::warn;
use std::collections::HashMap;

use crate::backend::{SourceTask, TrackerTask};

/// Find the counterpart of `source` in `tracker_tasks`.
///
/// The first to-do whose alias is exactly `notion-<id>` wins. Empty aliases never match.
/// This is the reference lookup: a cycle uses [`AliasIndex`], which must return the
/// same to-do for every task.
pub fn find_counterpart<'a>(source: &SourceTask, tracker_tasks: &'a [TrackerTask]) -> Option<&'a TrackerTask> {
    let alias = source.alias();
    tracker_tasks.iter().find(|t| !t.alias.is_empty() && t.alias == alias)
}

/// Alias lookup built once per sync cycle.
///
/// Precedence follows list order, so callers pass open to-dos before completed ones.
/// Duplicate aliases keep the first entry and are reported by [`AliasIndex::duplicates`].
#[derive(Debug, Default)]
pub struct AliasIndex<'a> {
    by_alias: HashMap<&'a str, &'a TrackerTask>,
    duplicates: Vec<&'a str>,
}

impl<'a> AliasIndex<'a> {
    pub fn build(tracker_tasks: &'a [TrackerTask]) -> Self {
        let mut index = Self::default();
        for task in tracker_tasks.iter().filter(|t| !t.alias.is_empty()) {
            if index.by_alias.contains_key(task.alias.as_str()) {
                if !index.duplicates.contains(&task.alias.as_str()) {
                    index.duplicates.push(task.alias.as_str());
                }
                continue;
            }
            index.by_alias.insert(task.alias.as_str(), task);
        }
        index
    }

    pub fn get(&self, source: &SourceTask) -> Option<&'a TrackerTask> {
        self.by_alias.get(source.alias().as_str()).copied()
    }

    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// Log every alias shared by more than one to-do.
    pub fn warn_duplicates(&self) {
        for alias in &self.duplicates {
            warn!("⚠️  Several Habitica to-dos share alias '{}', using the first one", alias);
        }
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}
