//! JSON snapshots of every fetched list.
//!
//! Snapshots are a debugging aid: they are overwritten on every fetch and never
//! read back. Failures are logged and otherwise ignored.

use anyhow::{Context, Result};
use log::{debug, error};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::BackupConfig;
use crate::constants::LOG_ERROR_BACKUP;

/// Writes pretty-printed JSON files into a fixed directory.
#[derive(Clone, Debug)]
pub struct BackupWriter {
    directory: PathBuf,
    enabled: bool,
}

impl BackupWriter {
    pub fn new(config: &BackupConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            enabled: config.enabled,
        }
    }

    /// A writer that never touches the disk.
    pub fn disabled() -> Self {
        Self {
            directory: PathBuf::new(),
            enabled: false,
        }
    }

    /// Overwrite `filename` with `data`, logging instead of failing.
    pub fn write<T: Serialize + ?Sized>(&self, filename: &str, data: &T) {
        if !self.enabled {
            return;
        }
        match self.try_write(filename, data) {
            Ok(path) => debug!("💾 Backup written to {}", path.display()),
            Err(e) => error!("{} {}: {:#}", LOG_ERROR_BACKUP, filename, e),
        }
    }

    fn try_write<T: Serialize + ?Sized>(&self, filename: &str, data: &T) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("Failed to create backup directory: {}", self.directory.display()))?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        data.serialize(&mut serializer).context("Failed to serialize backup")?;

        let path = self.directory.join(filename);
        std::fs::write(&path, buf).with_context(|| format!("Failed to write backup: {}", path.display()))?;
        Ok(path)
    }
}
