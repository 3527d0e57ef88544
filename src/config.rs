//! Configuration management for notion-habitica-sync
//!
//! This module handles loading, parsing, and validation of configuration files.
//! Secrets never live in the file: it names the environment variables that hold them.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_GENERATED, DEFAULT_CRON_SCHEDULE, ENV_CRON_SCHEDULE,
    ENV_HABITICA_API_KEY, ENV_HABITICA_API_USER, ENV_NOTION_DATABASE_ID, ENV_NOTION_FIELD_PRIORITY,
    ENV_NOTION_TOKEN, HABITICA_DEFAULT_BASE_URL, NOTION_DEFAULT_API_VERSION, NOTION_DEFAULT_BASE_URL,
    NOTION_DEFAULT_PRIORITY_FIELD, NOTION_DEFAULT_STATUS_FIELD, NOTION_DEFAULT_TITLE_FIELD,
};
use crate::logger;
use crate::scheduler::CronSchedule;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub notion: NotionConfig,
    pub habitica: HabiticaConfig,
    pub sync: SyncConfig,
    pub backup: BackupConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

/// Notion database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Environment variable holding the integration token
    pub token_env: String,
    /// Id of the database holding the tasks
    pub database_id: String,
    /// Title property holding the task name
    pub title_field: String,
    /// Status property driving the sync
    pub status_field: String,
    /// Property type of `status_field`, read and written in the same shape
    pub status_kind: StatusPropertyKind,
    /// Select property holding Low / Medium / High
    pub priority_field: String,
    /// Value of the `Notion-Version` header
    pub api_version: String,
    pub base_url: String,
}

/// Notion property type used by the status column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPropertyKind {
    /// Notion's built-in status property
    #[default]
    Status,
    /// A plain select property
    Select,
}

impl StatusPropertyKind {
    /// Key under which Notion nests the option name, e.g. `{"select": {"name": ...}}`.
    pub fn property_key(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Select => "select",
        }
    }
}

/// Habitica account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HabiticaConfig {
    /// Environment variable holding the user id
    pub api_user_env: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Cron expression (minute hour day-of-month month day-of-week), optionally led by seconds
    pub schedule: String,
    /// Run a cycle as soon as the process starts
    pub run_on_startup: bool,
    /// Also mark Notion tasks Done when their Habitica to-do was completed
    pub bidirectional: bool,
    /// Skip the whole cycle when any list could not be fetched
    pub skip_on_fetch_failure: bool,
}

/// Backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Write a JSON snapshot of every fetched list
    pub enabled: bool,
    pub directory: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of off, error, warn, info, debug, trace
    pub level: String,
    /// Also append log lines to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Secrets resolved from the environment at startup
#[derive(Clone)]
pub struct Credentials {
    pub notion_token: String,
    pub habitica_api_user: String,
    pub habitica_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("notion_token", &"<redacted>")
            .field("habitica_api_user", &self.habitica_api_user)
            .field("habitica_api_key", &"<redacted>")
            .finish()
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token_env: ENV_NOTION_TOKEN.to_string(),
            database_id: String::new(),
            title_field: NOTION_DEFAULT_TITLE_FIELD.to_string(),
            status_field: NOTION_DEFAULT_STATUS_FIELD.to_string(),
            status_kind: StatusPropertyKind::default(),
            priority_field: NOTION_DEFAULT_PRIORITY_FIELD.to_string(),
            api_version: NOTION_DEFAULT_API_VERSION.to_string(),
            base_url: NOTION_DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for HabiticaConfig {
    fn default() -> Self {
        Self {
            api_user_env: ENV_HABITICA_API_USER.to_string(),
            api_key_env: ENV_HABITICA_API_KEY.to_string(),
            base_url: HABITICA_DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            schedule: DEFAULT_CRON_SCHEDULE.to_string(),
            run_on_startup: true,
            bidirectional: false,
            skip_on_fetch_failure: true,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("data"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Config {
    /// Load configuration from the given file, the usual locations, or defaults.
    ///
    /// Environment overrides are applied on top and the result is validated.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with an explicit environment lookup.
    pub fn load_with<F>(explicit_path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit_path {
            Some(path) => Self::parse_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::parse_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        // 2. Check XDG config directory
        let xdg_config = Self::get_default_config_path().ok()?;
        xdg_config.exists().then_some(xdg_config)
    }

    /// Override file values with the environment variables the deployment sets.
    ///
    /// `lookup` abstracts `std::env::var` so tests do not touch process state.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(database_id) = non_empty(ENV_NOTION_DATABASE_ID) {
            self.notion.database_id = database_id;
        }
        if let Some(field) = non_empty(ENV_NOTION_FIELD_PRIORITY) {
            self.notion.priority_field = field;
        }
        if let Some(schedule) = non_empty(ENV_CRON_SCHEDULE) {
            self.sync.schedule = schedule;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.notion.database_id.trim().is_empty() {
            anyhow::bail!(
                "notion.database_id is empty; set it in the config file or via {}",
                ENV_NOTION_DATABASE_ID
            );
        }

        let fields = [
            ("notion.title_field", &self.notion.title_field),
            ("notion.status_field", &self.notion.status_field),
            ("notion.priority_field", &self.notion.priority_field),
            ("notion.token_env", &self.notion.token_env),
            ("habitica.api_user_env", &self.habitica.api_user_env),
            ("habitica.api_key_env", &self.habitica.api_key_env),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
        }

        CronSchedule::parse(&self.sync.schedule)
            .with_context(|| format!("Invalid sync.schedule '{}'", self.sync.schedule))?;

        logger::parse_level(&self.logging.level)?;

        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Read the secrets named by the config from the environment.
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        self.resolve_credentials_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_credentials_with<F>(&self, lookup: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Environment variable {} is not set", key))
        };

        Ok(Credentials {
            notion_token: require(&self.notion.token_env)?,
            habitica_api_user: require(&self.habitica.api_user_env)?,
            habitica_api_key: require(&self.habitica.api_key_env)?,
        })
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# notion-habitica-sync Configuration File\n# Generated on {}\n#\n# Secrets are read from the environment variables named by\n# notion.token_env, habitica.api_user_env and habitica.api_key_env.\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join(CONFIG_DIR_NAME))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
