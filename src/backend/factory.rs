//! Backend factory for creating backend instances from configuration.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use super::{habitica::HabiticaBackend, notion::NotionBackend, SourceBackend, TrackerBackend};
use crate::config::{Config, Credentials};

/// Create the Notion backend from configuration and resolved credentials.
///
/// # Errors
/// Returns error if the token cannot be sent as a header or the HTTP client
/// cannot be built
pub fn create_source_backend(config: &Config, credentials: &Credentials) -> Result<Arc<dyn SourceBackend>> {
    let backend = NotionBackend::new(
        &config.notion,
        &credentials.notion_token,
        Duration::from_secs(config.http.timeout_secs),
    )
    .context("Failed to create Notion backend")?;
    Ok(Arc::new(backend))
}

/// Create the Habitica backend from configuration and resolved credentials.
pub fn create_tracker_backend(config: &Config, credentials: &Credentials) -> Result<Arc<dyn TrackerBackend>> {
    let backend = HabiticaBackend::new(
        &config.habitica,
        &credentials.habitica_api_user,
        &credentials.habitica_api_key,
        Duration::from_secs(config.http.timeout_secs),
    )
    .context("Failed to create Habitica backend")?;
    Ok(Arc::new(backend))
}
