//! Application state and the command/outcome cycle that keeps it in sync
//! with the task service.
//!
//! User intents on `AppState` return `Command`s. The front end runs them
//! with `Command::run` on any executor and hands each `Outcome` back to
//! `AppState::apply` as soon as it arrives. Commands are never coordinated
//! with each other; the only ordering rule is that a list fetch is dropped
//! unless it is the latest one issued.

use crate::api::{TaskApi, TaskQuery};
use crate::error::{ApiError, TaskListError};
use crate::filter::{Filter, FilterMode, StatusFilter};
use crate::forms::{AddTaskForm, INVALID_CREDENTIALS_MESSAGE, LoginForm, SESSION_EXPIRED_MESSAGE};
use crate::model::{Credentials, NewTask, Task, TaskId};
use crate::session::Session;
use crate::store::TaskStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};

/// A list fetch, tagged with its sequence number.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub token: String,
    pub query: TaskQuery,
}

/// A network call requested by the state.
#[derive(Clone, PartialEq)]
pub enum Command {
    Login(Credentials),
    Fetch(FetchRequest),
    Create { token: String, task: NewTask },
    Complete { token: String, id: TaskId },
}

impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("seq", &self.seq)
            .field("query", &self.query)
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

// Bearer tokens stay out of debug output
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login(credentials) => f.debug_tuple("Login").field(credentials).finish(),
            Command::Fetch(request) => f.debug_tuple("Fetch").field(request).finish(),
            Command::Create { token, task } => f
                .debug_struct("Create")
                .field("has_token", &!token.is_empty())
                .field("task", task)
                .finish(),
            Command::Complete { token, id } => f
                .debug_struct("Complete")
                .field("has_token", &!token.is_empty())
                .field("id", id)
                .finish(),
        }
    }
}

/// The result of running a `Command`.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    LoggedIn(Result<String, ApiError>),
    Fetched {
        seq: u64,
        result: Result<Vec<Task>, ApiError>,
    },
    Created(Result<Task, ApiError>),
    Completed {
        id: TaskId,
        result: Result<Task, ApiError>,
    },
}

impl Command {
    /// Perform the call. Never retries.
    pub async fn run<A: TaskApi + ?Sized>(self, api: &A) -> Outcome {
        match self {
            Command::Login(credentials) => {
                debug!("Sending login request for {}", credentials.email);
                Outcome::LoggedIn(api.login(&credentials).await)
            }
            Command::Fetch(request) => {
                debug!("Fetching tasks #{} with {:?}", request.seq, request.query);
                let result = api.list_tasks(&request.token, &request.query).await;
                Outcome::Fetched {
                    seq: request.seq,
                    result,
                }
            }
            Command::Create { token, task } => {
                debug!("Creating task with {} tag(s)", task.tags.len());
                Outcome::Created(api.create_task(&token, &task).await)
            }
            Command::Complete { token, id } => {
                debug!("Completing task {}", id);
                let result = api.complete_task(&token, &id).await;
                Outcome::Completed { id, result }
            }
        }
    }
}

/// Everything the UI shows, owned by the root of the front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    pub session: Session,
    pub store: TaskStore,
    pub filter: Filter,
    pub login_form: LoginForm,
    pub add_form: AddTaskForm,
    pub tag_input: String,
    /// Non-modal status line, e.g. after a failed fetch
    pub notice: Option<String>,
    #[serde(skip)]
    latest_fetch: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Tasks to render under the current filter
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        self.store.visible(&self.filter)
    }

    /// Sequence number of the most recent fetch issued
    pub fn latest_fetch(&self) -> u64 {
        self.latest_fetch
    }

    /// Submit the login form. `None` while a field is empty.
    pub fn submit_login(&mut self) -> Option<Command> {
        self.login_form.submit().map(Command::Login)
    }

    /// Pick all/done/pending. Refetches only if the filter changed.
    pub fn select_filter(&mut self, status: StatusFilter) -> Option<Command> {
        if self.filter.select(status) {
            info!("Filter set to {}", self.filter.mode().label());
            self.sync()
        } else {
            None
        }
    }

    /// Apply the tag typed into the tag input. Blank input does nothing.
    pub fn submit_tag_filter(&mut self) -> Option<Command> {
        if self.filter.apply_tag(&self.tag_input) {
            info!("Filter set to tag {:?}", self.filter.active_tag());
            self.sync()
        } else {
            None
        }
    }

    /// Issue a fetch for the current filter, if logged in.
    ///
    /// Bumps the sequence number, which retires any fetch still in flight.
    pub fn sync(&mut self) -> Option<Command> {
        let token = self.session.token()?.to_string();
        self.latest_fetch += 1;
        Some(Command::Fetch(FetchRequest {
            seq: self.latest_fetch,
            token,
            query: self.filter.query(),
        }))
    }

    /// Submit the add-task form. Blank text is a no-op.
    pub fn submit_add(&mut self) -> Result<Option<Command>, TaskListError> {
        let Some(task) = self.add_form.draft() else {
            return Ok(None);
        };
        let token = self
            .session
            .token()
            .ok_or(TaskListError::NotAuthenticated)?
            .to_string();
        Ok(Some(Command::Create { token, task }))
    }

    /// Ask the server to mark a pending task done. Done or unknown tasks
    /// produce no request.
    pub fn complete(&mut self, id: &TaskId) -> Result<Option<Command>, TaskListError> {
        let token = self
            .session
            .token()
            .ok_or(TaskListError::NotAuthenticated)?
            .to_string();
        match self.store.get(id) {
            Some(task) if !task.done => Ok(Some(Command::Complete {
                token,
                id: id.clone(),
            })),
            Some(_) => Ok(None),
            None => {
                warn!("Ignoring completion of unknown task {}", id);
                Ok(None)
            }
        }
    }

    /// Drop the token and everything fetched with it.
    pub fn sign_out(&mut self) {
        info!("Signing out");
        self.session.sign_out();
        self.store.clear();
        self.login_form.reset();
        self.notice = None;
        // Anything still in flight belongs to the old session.
        self.latest_fetch += 1;
    }

    /// Merge the result of a command into the state.
    ///
    /// Returns a follow-up command when the change calls for a refetch.
    /// Login and mutation failures come back as errors for the UI to show;
    /// fetch failures are only logged and noted.
    pub fn apply(&mut self, outcome: Outcome) -> Result<Option<Command>, TaskListError> {
        match outcome {
            Outcome::LoggedIn(Ok(token)) => {
                info!("Login succeeded");
                let changed = self.session.authenticate(token);
                self.login_form.reset();
                self.notice = None;
                Ok(if changed { self.sync() } else { None })
            }
            Outcome::LoggedIn(Err(e)) => {
                warn!("Login failed: {}", e);
                self.login_form.error = Some(INVALID_CREDENTIALS_MESSAGE.to_string());
                Err(TaskListError::AuthFailure(e))
            }
            Outcome::Fetched { seq, result } => {
                if seq != self.latest_fetch {
                    debug!(
                        "Discarding stale fetch #{} (latest is #{})",
                        seq, self.latest_fetch
                    );
                    return Ok(None);
                }
                match result {
                    Ok(tasks) => {
                        info!("Loaded {} task(s)", tasks.len());
                        self.store.replace_all(tasks);
                        self.notice = None;
                    }
                    Err(e) => {
                        error!("Failed to fetch tasks: {}", e);
                        self.handle_unauthorized(&e);
                        self.notice = Some(TaskListError::FetchFailure(e).user_message());
                    }
                }
                Ok(None)
            }
            Outcome::Created(Ok(task)) => {
                if !self.is_authenticated() {
                    debug!("Dropping created task {} after sign-out", task.id);
                    return Ok(None);
                }
                info!("Added task {}", task.id);
                self.store.append(task);
                self.add_form.clear();
                if self.filter.mode() == FilterMode::Done
                    && self.filter.select(StatusFilter::All)
                {
                    return Ok(self.sync());
                }
                Ok(None)
            }
            Outcome::Completed { id, result: Ok(task) } => {
                if !self.is_authenticated() {
                    debug!("Dropping completion of {} after sign-out", id);
                    return Ok(None);
                }
                info!("Completed task {}", task.id);
                if !self.store.replace(task) {
                    warn!("Completed task {} is no longer in the list", id);
                }
                Ok(None)
            }
            Outcome::Created(Err(e)) => {
                error!("Failed to add task: {}", e);
                self.handle_unauthorized(&e);
                Err(TaskListError::MutationFailure(e))
            }
            Outcome::Completed { id, result: Err(e) } => {
                error!("Failed to complete task {}: {}", id, e);
                self.handle_unauthorized(&e);
                Err(TaskListError::MutationFailure(e))
            }
        }
    }

    fn handle_unauthorized(&mut self, error: &ApiError) {
        if error.is_unauthorized() && self.session.expire() {
            warn!("Session expired");
            self.latest_fetch += 1;
            self.login_form.error = Some(SESSION_EXPIRED_MESSAGE.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn logged_in() -> AppState {
        let mut state = AppState::new();
        let follow_up = state.apply(Outcome::LoggedIn(Ok("tok".to_string()))).unwrap();
        assert!(matches!(follow_up, Some(Command::Fetch(_))));
        state
    }

    fn fetch_seq(command: Option<Command>) -> u64 {
        match command {
            Some(Command::Fetch(request)) => request.seq,
            other => panic!("Expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_no_fetch_without_token() {
        let mut state = AppState::new();
        assert_eq!(state.sync(), None);
        assert_eq!(state.select_filter(StatusFilter::Done), None);
        assert_eq!(state.filter.mode(), FilterMode::Done);
    }

    #[test]
    fn test_login_triggers_unfiltered_fetch() {
        let mut state = AppState::new();
        let command = state.apply(Outcome::LoggedIn(Ok("tok".to_string()))).unwrap();
        assert_eq!(
            command,
            Some(Command::Fetch(FetchRequest {
                seq: 1,
                token: "tok".to_string(),
                query: TaskQuery::All,
            }))
        );
        assert_eq!(state.session.token(), Some("tok"));
    }

    #[test]
    fn test_failed_login_leaves_token_unset() {
        let mut state = AppState::new();
        let err = state
            .apply(Outcome::LoggedIn(Err(ApiError::Unauthorized)))
            .unwrap_err();
        assert!(matches!(err, TaskListError::AuthFailure(_)));
        assert_eq!(state.session.token(), None);
        assert_eq!(
            state.login_form.error.as_deref(),
            Some(INVALID_CREDENTIALS_MESSAGE)
        );
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut state = logged_in();
        let first = fetch_seq(state.select_filter(StatusFilter::Pending));
        let second = fetch_seq(state.select_filter(StatusFilter::Done));
        assert!(second > first);

        state
            .apply(Outcome::Fetched {
                seq: second,
                result: Ok(vec![Task::new(2, "B", true)]),
            })
            .unwrap();
        state
            .apply(Outcome::Fetched {
                seq: first,
                result: Ok(vec![Task::new(9, "stale", false)]),
            })
            .unwrap();

        assert_eq!(state.store.as_slice(), &[Task::new(2, "B", true)]);
    }

    #[test]
    fn test_fetch_failure_keeps_store() {
        let mut state = logged_in();
        let seq = fetch_seq(state.sync());
        state.store.replace_all(vec![Task::new(1, "A", false)]);

        let follow_up = state
            .apply(Outcome::Fetched {
                seq,
                result: Err(ApiError::status(500, "boom")),
            })
            .unwrap();

        assert_eq!(follow_up, None);
        assert_eq!(state.store.len(), 1);
        assert!(state.notice.is_some());
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_unauthorized_fetch_expires_session() {
        let mut state = logged_in();
        let seq = state.latest_fetch();
        state
            .apply(Outcome::Fetched {
                seq,
                result: Err(ApiError::Unauthorized),
            })
            .unwrap();
        assert_eq!(state.session.state(), SessionState::Expired);
        assert_eq!(state.sync(), None);
        assert_eq!(
            state.login_form.error.as_deref(),
            Some(SESSION_EXPIRED_MESSAGE)
        );
    }

    #[test]
    fn test_add_in_done_mode_switches_to_all() {
        let mut state = logged_in();
        fetch_seq(state.select_filter(StatusFilter::Done));
        state.add_form.text = "new".to_string();

        let follow_up = state
            .apply(Outcome::Created(Ok(Task::new(5, "new", false))))
            .unwrap();

        assert_eq!(state.filter.mode(), FilterMode::All);
        assert!(matches!(follow_up, Some(Command::Fetch(_))));
        assert_eq!(state.store.iter().last().map(|t| &t.id), Some(&TaskId::from(5)));
        assert!(state.add_form.text.is_empty());
    }

    #[test]
    fn test_add_failure_keeps_inputs() {
        let mut state = logged_in();
        state.add_form.text = "keep me".to_string();
        let err = state
            .apply(Outcome::Created(Err(ApiError::status(500, "boom"))))
            .unwrap_err();
        assert!(matches!(err, TaskListError::MutationFailure(_)));
        assert_eq!(state.add_form.text, "keep me");
        assert!(state.store.is_empty());
    }

    #[test]
    fn test_complete_only_pending_tasks() {
        let mut state = logged_in();
        state
            .store
            .replace_all(vec![Task::new(1, "A", false), Task::new(2, "B", true)]);

        assert!(matches!(
            state.complete(&TaskId::from(1)).unwrap(),
            Some(Command::Complete { .. })
        ));
        assert_eq!(state.complete(&TaskId::from(2)).unwrap(), None);
        assert_eq!(state.complete(&TaskId::from(3)).unwrap(), None);
    }

    #[test]
    fn test_mutations_require_token() {
        let mut state = AppState::new();
        state.add_form.text = "x".to_string();
        assert_eq!(state.submit_add(), Err(TaskListError::NotAuthenticated));
        assert_eq!(
            state.complete(&TaskId::from(1)),
            Err(TaskListError::NotAuthenticated)
        );
    }

    #[test]
    fn test_sign_out_discards_in_flight_fetch() {
        let mut state = logged_in();
        let seq = state.latest_fetch();
        state.sign_out();
        state
            .apply(Outcome::Fetched {
                seq,
                result: Ok(vec![Task::new(1, "A", false)]),
            })
            .unwrap();
        assert!(state.store.is_empty());
        assert_eq!(state.session.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_serialized_state_omits_secrets() {
        let mut state = logged_in();
        state.login_form.password = "hunter2".to_string();
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("tok"));
    }

    #[test]
    fn test_command_debug_hides_token() {
        let mut state = AppState::new();
        state
            .apply(Outcome::LoggedIn(Ok("secret-bearer".to_string())))
            .unwrap();
        state.add_form.text = "buy milk".to_string();
        state.store.append(Task::new(1, "A", false));

        let commands = [
            state.sync().unwrap(),
            state.submit_add().unwrap().unwrap(),
            state.complete(&TaskId::from(1)).unwrap().unwrap(),
        ];
        for command in commands {
            let debug = format!("{:?}", command);
            assert!(!debug.contains("secret-bearer"), "{}", debug);
            assert!(debug.contains("has_token: true"), "{}", debug);
        }
    }
}
