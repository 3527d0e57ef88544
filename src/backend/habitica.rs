//! Habitica backend implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{ensure_success, BackendError, CreateTodoArgs, TrackerBackend, TrackerTask};
use crate::config::HabiticaConfig;
use crate::constants::HABITICA_CLIENT_SUFFIX;

/// Envelope every Habitica v3 response is wrapped in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Todo {
    id: String,
    text: String,
    #[serde(default)]
    alias: Option<String>,
}

/// Habitica backend implementation.
pub struct HabiticaBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HabiticaBackend {
    /// Create a new Habitica backend with the provided user id and API key.
    pub fn new(config: &HabiticaConfig, api_user: &str, api_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        let header = |value: &str| {
            HeaderValue::from_str(value).map_err(|e| BackendError::Auth(format!("Invalid Habitica credential: {e}")))
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-user", header(api_user)?);
        let mut key = header(api_key)?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert("x-client", header(&format!("{api_user}-{HABITICA_CLIENT_SUFFIX}"))?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    // Helper: Transform a Habitica to-do → tracker task
    fn todo_to_tracker(todo: Todo, done: bool) -> TrackerTask {
        TrackerTask {
            id: todo.id,
            name: todo.text,
            alias: todo.alias.unwrap_or_default(),
            done,
        }
    }

    async fn fetch_list(&self, list_type: &str, done: bool) -> Result<Vec<TrackerTask>, BackendError> {
        let url = format!("{}/api/v3/tasks/user", self.base_url);
        let response = self.client.get(&url).query(&[("type", list_type)]).send().await?;
        let envelope: Envelope<Vec<Todo>> = ensure_success(response).await?.json().await?;

        Ok(envelope
            .data
            .into_iter()
            .map(|todo| Self::todo_to_tracker(todo, done))
            .collect())
    }

    fn task_url(&self, remote_id: &str) -> String {
        format!("{}/api/v3/tasks/{}", self.base_url, remote_id)
    }
}

#[async_trait]
impl TrackerBackend for HabiticaBackend {
    async fn fetch_open_tasks(&self) -> Result<Vec<TrackerTask>, BackendError> {
        self.fetch_list("todos", false).await
    }

    async fn fetch_completed_tasks(&self) -> Result<Vec<TrackerTask>, BackendError> {
        self.fetch_list("completedTodos", true).await
    }

    async fn create_task(&self, args: CreateTodoArgs) -> Result<(), BackendError> {
        let url = format!("{}/api/v3/tasks/user", self.base_url);
        let body = json!({
            "text": args.text,
            "type": "todo",
            "alias": args.alias,
            "priority": args.priority,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn rename_task(&self, remote_id: &str, text: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.task_url(remote_id))
            .json(&json!({ "text": text }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn score_task(&self, remote_id: &str) -> Result<(), BackendError> {
        let url = format!("{}/score/up", self.task_url(remote_id));
        let response = self.client.post(&url).json(&json!({})).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), BackendError> {
        let response = self.client.delete(self.task_url(remote_id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
