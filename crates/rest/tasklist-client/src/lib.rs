//! HTTP client for the task list auth and task services
//!
//! Implements `tasklist_core::TaskApi` with `reqwest`:
//!
//! - `POST /login` exchanges credentials for a bearer token
//! - `GET /todos` and `GET /todos/por-tag?tag=` fetch task lists
//! - `POST /todos` creates a task
//! - `PUT /todos/:id` marks a task done
//!
//! # Examples
//!
//! ```rust,no_run
//! use tasklist_client::TaskServiceClientBuilder;
//! use tasklist_core::{Credentials, TaskApi, TaskQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TaskServiceClientBuilder::new("http://localhost:3000").build()?;
//!
//!     let token = client
//!         .login(&Credentials::new("ana@example.com", "secret"))
//!         .await?;
//!     let tasks = client.list_tasks(&token, &TaskQuery::All).await?;
//!     println!("{} task(s)", tasks.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{TaskServiceClient, TaskServiceClientBuilder};
pub use config::{ClientConfig, DEFAULT_SERVER_URL};
pub use error::{ClientError, ClientResult};
