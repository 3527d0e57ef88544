//! Notion backend implementation.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::{ensure_success, BackendError, Priority, SourceBackend, SourceTask, TaskStatus};
use crate::config::{NotionConfig, StatusPropertyKind};
use crate::constants::STATUS_DONE;

/// One page of a database query.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Page {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// Notion backend implementation.
pub struct NotionBackend {
    client: reqwest::Client,
    base_url: String,
    database_id: String,
    title_field: String,
    status_field: String,
    status_kind: StatusPropertyKind,
    priority_field: String,
}

impl NotionBackend {
    /// Create a new Notion backend for the configured database.
    ///
    /// # Arguments
    /// * `config` - Database id, property names, API version and base URL
    /// * `token` - Integration token sent as a bearer credential
    /// * `timeout` - Per-request timeout
    pub fn new(config: &NotionConfig, token: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| BackendError::Auth(format!("Invalid Notion token: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            "Notion-Version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| BackendError::Other(format!("Invalid Notion API version: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            database_id: config.database_id.clone(),
            title_field: config.title_field.clone(),
            status_field: config.status_field.clone(),
            status_kind: config.status_kind,
            priority_field: config.priority_field.clone(),
        })
    }

    // Helper: Transform a Notion page → source task
    fn page_to_source(&self, page: &Page) -> Result<SourceTask, BackendError> {
        let name = page
            .properties
            .get(&self.title_field)
            .and_then(|p| p.get("title"))
            .and_then(|t| t.get(0))
            .and_then(|first| {
                first
                    .pointer("/text/content")
                    .or_else(|| first.get("plain_text"))
                    .and_then(Value::as_str)
            })
            .ok_or_else(|| BackendError::InvalidData(format!("page {} has no '{}' title", page.id, self.title_field)))?;

        let status_key = self.status_kind.property_key();
        let status = page
            .properties
            .get(&self.status_field)
            .and_then(|p| p.get(status_key))
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BackendError::InvalidData(format!(
                    "page {} has no '{}' property of type {} (see notion.status_kind)",
                    page.id, self.status_field, status_key
                ))
            })?;

        let priority = page
            .properties
            .get(&self.priority_field)
            .and_then(|p| p.pointer("/select/name"))
            .and_then(Value::as_str)
            .and_then(Priority::from_name);

        Ok(SourceTask {
            id: page.id.clone(),
            name: name.to_string(),
            priority,
            status: TaskStatus::from_label(status),
        })
    }

    async fn query_page(&self, cursor: Option<&str>) -> Result<QueryResponse, BackendError> {
        let url = format!("{}/v1/databases/{}/query", self.base_url, self.database_id);
        let body = match cursor {
            Some(cursor) => json!({ "start_cursor": cursor }),
            None => json!({}),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<QueryResponse>().await?)
    }
}

#[async_trait]
impl SourceBackend for NotionBackend {
    async fn fetch_tasks(&self) -> Result<Vec<SourceTask>, BackendError> {
        let mut tasks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.query_page(cursor.as_deref()).await?;
            debug!("Notion query returned {} pages (has_more: {})", page.results.len(), page.has_more);

            for result in &page.results {
                match self.page_to_source(result) {
                    Ok(task) => tasks.push(task),
                    Err(e) => warn!("⚠️  Skipping Notion page: {e}"),
                }
            }

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(tasks)
    }

    async fn mark_done(&self, remote_id: &str) -> Result<(), BackendError> {
        let url = format!("{}/v1/pages/{}", self.base_url, remote_id);
        let mut properties = Map::new();
        properties.insert(
            self.status_field.clone(),
            json!({ (self.status_kind.property_key()): { "name": STATUS_DONE } }),
        );
        let body = json!({ "properties": properties });

        let response = self.client.patch(&url).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
