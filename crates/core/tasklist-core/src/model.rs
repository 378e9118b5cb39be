//! Task records and the request/response bodies exchanged with the services.
//!
//! Rust field names are English; the wire uses the service's field names
//! (`texto`, `feito`, `senha`) through serde renames.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned task identifier.
///
/// The service may hand out numeric or string ids, so both are accepted and
/// echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        TaskId::Number(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        TaskId::Text(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        TaskId::Text(value)
    }
}

/// A task as returned by the task service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "feito", default)]
    pub done: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, text: impl Into<String>, done: bool) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            done,
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "feito")]
    pub done: bool,
    pub tags: Vec<String>,
}

impl NewTask {
    /// A not-yet-done task; new tasks are always created pending.
    pub fn pending(text: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
            tags,
        }
    }
}

/// Body of `PUT /todos/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(rename = "feito")]
    pub done: bool,
}

impl TaskPatch {
    pub fn completed() -> Self {
        Self { done: true }
    }
}

/// Login credentials collected by the login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn as_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: &self.email,
            senha: &self.password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub senha: &'a str,
}

/// Successful `POST /login` response.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token_len", &self.token.len())
            .finish()
    }
}
