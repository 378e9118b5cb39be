//! Core state and filtering logic for the task list client.
//!
//! This crate owns everything between the UI and the remote task service,
//! without doing any I/O itself:
//!
//! - `Task`, `NewTask` and the wire types shared with the HTTP client
//! - `TaskStore`, the ordered in-memory task collection
//! - `Filter`, the all/done/pending/tag filter controller
//! - `Session`, the bearer token lifecycle
//! - Form buffers for login and adding tasks
//! - `AppState`, which turns user intents into `Command`s and applies the
//!   `Outcome`s of running them against a `TaskApi`
//!
//! Front ends run `Command`s on whatever executor they like and feed the
//! outcomes back in the order they complete. Fetch outcomes carry a sequence
//! number so only the latest list request can replace the store.

pub mod api;
pub mod error;
pub mod filter;
pub mod forms;
pub mod model;
pub mod row;
pub mod session;
pub mod state;
pub mod store;

pub use api::{TaskApi, TaskQuery};
pub use error::{ApiError, TaskListError};
pub use filter::{Filter, FilterMode, StatusFilter};
pub use forms::{
    AddField, AddTaskForm, INVALID_CREDENTIALS_MESSAGE, LoginField, LoginForm,
    SESSION_EXPIRED_MESSAGE, parse_tags,
};
pub use model::{Credentials, LoginRequest, LoginResponse, NewTask, Task, TaskId, TaskPatch};
pub use row::TaskRow;
pub use session::{Session, SessionState};
pub use state::{AppState, Command, FetchRequest, Outcome};
pub use store::TaskStore;
