use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tasklist_core::{
    ApiError, Credentials, LoginResponse, NewTask, Task, TaskApi, TaskId, TaskPatch, TaskQuery,
};
use tracing::{debug, warn};

/// Client for the auth and task services.
///
/// Holds no token; every task call takes the bearer token explicitly.
#[derive(Clone, Debug)]
pub struct TaskServiceClient {
    client: reqwest::Client,
    server_url: Url,
}

/// Builder for `TaskServiceClient`
pub struct TaskServiceClientBuilder {
    server_url: String,
    timeout: Option<Duration>,
}

impl TaskServiceClientBuilder {
    /// Create a new client builder with the required server URL
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            timeout: None,
        }
    }

    /// Set the default timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is not a valid base URL or the
    /// underlying HTTP client fails to build
    pub fn build(self) -> ClientResult<TaskServiceClient> {
        let server_url = Url::parse(&self.server_url)
            .map_err(|e| ClientError::invalid_url(format!("{}: {}", self.server_url, e)))?;
        if server_url.cannot_be_a_base() {
            return Err(ClientError::invalid_url(self.server_url));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut client_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder
            .build()
            .map_err(|e| ClientError::configuration(e.to_string()))?;

        Ok(TaskServiceClient { client, server_url })
    }
}

impl TaskServiceClient {
    pub fn builder(server_url: impl Into<String>) -> TaskServiceClientBuilder {
        TaskServiceClientBuilder::new(server_url)
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = TaskServiceClientBuilder::new(config.server_url.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.with_timeout(timeout);
        }
        builder.build()
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Append path segments to the server URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.server_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::invalid_url(self.server_url.as_str()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token)
    }

    /// Call `POST /login`
    pub async fn post_login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        let url = self.endpoint(&["login"])?;
        let response = self
            .client
            .post(url)
            .json(&credentials.as_request())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Call `GET /todos`
    pub async fn get_todos(&self, token: &str) -> ClientResult<Vec<Task>> {
        let url = self.endpoint(&["todos"])?;
        let response = self
            .authorized(self.client.get(url), token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Call `GET /todos/por-tag?tag=...`
    pub async fn get_todos_by_tag(&self, token: &str, tag: &str) -> ClientResult<Vec<Task>> {
        let url = self.endpoint(&["todos", "por-tag"])?;
        let response = self
            .authorized(self.client.get(url), token)
            .query(&[("tag", tag)])
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Call `POST /todos`
    pub async fn post_todo(&self, token: &str, task: &NewTask) -> ClientResult<Task> {
        let url = self.endpoint(&["todos"])?;
        let response = self
            .authorized(self.client.post(url), token)
            .json(task)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Call `PUT /todos/:id`
    pub async fn put_todo(&self, token: &str, id: &TaskId, patch: TaskPatch) -> ClientResult<Task> {
        let id = id.to_string();
        let url = self.endpoint(&["todos", &id])?;
        let response = self
            .authorized(self.client.put(url), token)
            .json(&patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let url = response.url().clone();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(
                "Request to {} failed with {}: {}",
                url.path(),
                status,
                truncate_body(&error_text)
            );
            Err(ClientError::status(status.as_u16(), error_text))
        }
    }
}

/// Keep logged error bodies short
fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl TaskApi for TaskServiceClient {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let response = self.post_login(credentials).await?;
        debug!("Received token ({} bytes)", response.token.len());
        Ok(response.token)
    }

    async fn list_tasks(&self, token: &str, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        let tasks = match query {
            TaskQuery::All => self.get_todos(token).await?,
            TaskQuery::ByTag(tag) => self.get_todos_by_tag(token, tag).await?,
        };
        Ok(tasks)
    }

    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError> {
        Ok(self.post_todo(token, task).await?)
    }

    async fn complete_task(&self, token: &str, id: &TaskId) -> Result<Task, ApiError> {
        Ok(self.put_todo(token, id, TaskPatch::completed()).await?)
    }
}
