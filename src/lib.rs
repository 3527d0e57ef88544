//! notion-habitica-sync - keeps a Habitica to-do list in step with a Notion database
//!
//! Notion is the source of truth: every task in the configured database gets a
//! Habitica to-do whose alias is `notion-<page id>`. Status changes in Notion
//! rename, complete, or delete that to-do. Optionally, completing the to-do in
//! Habitica marks the Notion task Done.
//!
//! # Modules
//!
//! * [`config`] - Application configuration management
//! * [`backend`] - Notion and Habitica API clients behind common traits
//! * [`sync`] - Matching, action resolution and the mutation queue
//! * [`scheduler`] - Cron-driven sync triggering

/// Notion and Habitica API clients and the normalized task model
pub mod backend;

/// JSON snapshots of fetched lists
pub mod backup;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Logging setup
pub mod logger;

/// Cron schedule parsing and the trigger loop
pub mod scheduler;

/// Synchronization engine
pub mod sync;
