//! The seam between application state and the remote services.

use crate::error::ApiError;
use crate::model::{Credentials, NewTask, Task, TaskId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which list to ask the task service for.
///
/// Done/pending filtering happens client-side, so the server only ever sees
/// "everything" or "everything with this tag".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskQuery {
    All,
    ByTag(String),
}

/// Operations offered by the auth and task services.
///
/// Every task operation takes the bearer token explicitly; implementations
/// hold no session state of their own.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError>;

    /// Fetch the full list or the tag-scoped list
    async fn list_tasks(&self, token: &str, query: &TaskQuery) -> Result<Vec<Task>, ApiError>;

    /// Create a task and return the server's copy with its assigned id
    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError>;

    /// Mark a task done and return the server's updated copy
    async fn complete_task(&self, token: &str, id: &TaskId) -> Result<Task, ApiError>;
}

#[async_trait]
impl<T: TaskApi + ?Sized> TaskApi for Arc<T> {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        (**self).login(credentials).await
    }

    async fn list_tasks(&self, token: &str, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        (**self).list_tasks(token, query).await
    }

    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError> {
        (**self).create_task(token, task).await
    }

    async fn complete_task(&self, token: &str, id: &TaskId) -> Result<Task, ApiError> {
        (**self).complete_task(token, id).await
    }
}
