//! Constants used throughout the application
//!
//! This module centralizes endpoint defaults, status labels, backup file names
//! and log messages to improve maintainability and consistency.

// Remote endpoints
pub const NOTION_DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const NOTION_DEFAULT_API_VERSION: &str = "2021-05-13";
pub const HABITICA_DEFAULT_BASE_URL: &str = "https://habitica.com";

/// Prefix of the Habitica alias that links a to-do back to its Notion page
pub const ALIAS_PREFIX: &str = "notion-";

/// Suffix appended to `x-api-user` to build the `x-client` header Habitica asks for
pub const HABITICA_CLIENT_SUFFIX: &str = "notion-habitica-sync";

// Notion status vocabulary
pub const STATUS_TODO: &str = "To Do";
pub const STATUS_BACKLOG: &str = "BackLog";
pub const STATUS_IN_PROGRESS: &str = "In progress";
pub const STATUS_DONE: &str = "Done";
pub const STATUS_ARCHIVED: &str = "Archived";
pub const STATUS_CANCELED: &str = "Canceled";

// Default Notion property names
pub const NOTION_DEFAULT_TITLE_FIELD: &str = "Name";
pub const NOTION_DEFAULT_STATUS_FIELD: &str = "Status";
pub const NOTION_DEFAULT_PRIORITY_FIELD: &str = "Priority";

// Environment variables
pub const ENV_NOTION_TOKEN: &str = "NOTION_TOKEN";
pub const ENV_NOTION_DATABASE_ID: &str = "NOTION_DATABASE_ID";
pub const ENV_NOTION_FIELD_PRIORITY: &str = "NOTION_FIELD_PRIORITY";
pub const ENV_HABITICA_API_USER: &str = "HABITICA_API_USER";
pub const ENV_HABITICA_API_KEY: &str = "HABITICA_API_KEY";
pub const ENV_CRON_SCHEDULE: &str = "CRON_SCHEDULE";

/// Every fifteen minutes
pub const DEFAULT_CRON_SCHEDULE: &str = "*/15 * * * *";

// Backup snapshots, one per fetched list
pub const BACKUP_NOTION: &str = "notion.json";
pub const BACKUP_NOTION_PENDING: &str = "notion_pending.json";
pub const BACKUP_HABITICA: &str = "habitica.json";
pub const BACKUP_HABITICA_DONE: &str = "habitica_done.json";

// Log Messages
pub const LOG_SYNC_STARTED: &str = "🔄 Reading and syncing data...";
pub const LOG_SYNC_FORWARD: &str = "🔄 Syncing Notion to Habitica...";
pub const LOG_SYNC_REVERSE: &str = "🔄 Syncing Habitica to Notion...";
pub const LOG_SYNC_SKIPPED_IN_PROGRESS: &str = "⚠️  Sync already in progress, skipping this trigger";
pub const LOG_SCHEDULED_SYNC: &str = "⏰ Running scheduled sync...";
pub const LOG_ERROR_FETCH_NOTION: &str = "❌ Failed to read Notion database";
pub const LOG_ERROR_FETCH_HABITICA: &str = "❌ Failed to read Habitica to-dos";
pub const LOG_ERROR_FETCH_HABITICA_DONE: &str = "❌ Failed to read Habitica completed to-dos";
pub const LOG_ERROR_BACKUP: &str = "❌ Failed to write backup";

// CLI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const CONFIG_FILE_NAME: &str = "notion-habitica-sync.toml";
pub const CONFIG_DIR_NAME: &str = "notion-habitica-sync";
