//! End-to-end tests of the command/outcome cycle against an in-memory service
//!
//! These tests cover:
//! - Login gating and the initial unfiltered fetch
//! - Client-side done/pending filtering and server-side tag filtering
//! - Adding and completing tasks with server-assigned records
//! - Out-of-order fetch responses

use async_trait::async_trait;
use std::sync::Mutex;
use tasklist_core::{
    ApiError, AppState, Command, Credentials, FilterMode, NewTask, StatusFilter, Task, TaskApi,
    TaskId, TaskListError, TaskQuery,
};

/// What the fake service saw
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Login(String),
    List(TaskQuery),
    Create(NewTask),
    Complete(TaskId),
}

/// In-memory stand-in for the auth and task services
struct FakeService {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    next_id: Mutex<i64>,
    fail_mutations: bool,
}

impl FakeService {
    fn new(tasks: Vec<Task>) -> Self {
        let next_id = tasks.len() as i64 + 1;
        Self {
            tasks: Mutex::new(tasks),
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(next_id),
            fail_mutations: false,
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_token(token: &str) -> Result<(), ApiError> {
        if token == "good-token" {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

#[async_trait]
impl TaskApi for FakeService {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        self.record(Call::Login(credentials.email.clone()));
        if credentials.email == "ana@example.com" && credentials.password == "secret" {
            Ok("good-token".to_string())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    async fn list_tasks(&self, token: &str, query: &TaskQuery) -> Result<Vec<Task>, ApiError> {
        Self::check_token(token)?;
        self.record(Call::List(query.clone()));
        let tasks = self.tasks.lock().unwrap();
        Ok(match query {
            TaskQuery::All => tasks.clone(),
            TaskQuery::ByTag(tag) => tasks
                .iter()
                .filter(|t| t.tags.iter().any(|x| x == tag))
                .cloned()
                .collect(),
        })
    }

    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError> {
        Self::check_token(token)?;
        self.record(Call::Create(task.clone()));
        if self.fail_mutations {
            return Err(ApiError::status(500, "database unavailable"));
        }
        let mut next_id = self.next_id.lock().unwrap();
        let created = Task::new(*next_id, task.text.clone(), task.done).with_tags(task.tags.clone());
        *next_id += 1;
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn complete_task(&self, token: &str, id: &TaskId) -> Result<Task, ApiError> {
        Self::check_token(token)?;
        self.record(Call::Complete(id.clone()));
        if self.fail_mutations {
            return Err(ApiError::status(500, "database unavailable"));
        }
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| ApiError::status(404, "not found"))?;
        task.done = true;
        Ok(task.clone())
    }
}

fn seed() -> Vec<Task> {
    vec![
        Task::new(1, "A", false).with_tags(["home"]),
        Task::new(2, "B", true).with_tags(["work"]),
    ]
}

/// Run a command and apply its outcome, following up on any refetch
async fn drive(
    state: &mut AppState,
    api: &FakeService,
    command: Option<Command>,
) -> Result<(), TaskListError> {
    let mut next = command;
    while let Some(command) = next.take() {
        let outcome = command.run(api).await;
        next = state.apply(outcome)?;
    }
    Ok(())
}

async fn login(state: &mut AppState, api: &FakeService) {
    state.login_form.email = "ana@example.com".to_string();
    state.login_form.password = "secret".to_string();
    let command = state.submit_login();
    drive(state, api, command).await.unwrap();
}

fn visible_ids(state: &AppState) -> Vec<TaskId> {
    state.visible_tasks().map(|t| t.id.clone()).collect()
}

#[tokio::test]
async fn test_rejected_login_shows_invalid_credentials() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    state.login_form.email = "ana@example.com".to_string();
    state.login_form.password = "wrong".to_string();

    let command = state.submit_login();
    let err = drive(&mut state, &api, command).await.unwrap_err();

    assert!(matches!(err, TaskListError::AuthFailure(_)));
    assert!(!state.is_authenticated());
    assert_eq!(
        state.login_form.error.as_deref(),
        Some(tasklist_core::INVALID_CREDENTIALS_MESSAGE)
    );
    assert_eq!(api.calls(), vec![Call::Login("ana@example.com".to_string())]);
}

#[tokio::test]
async fn test_login_fetches_unfiltered_list() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    login(&mut state, &api).await;

    assert!(state.is_authenticated());
    assert_eq!(
        api.calls(),
        vec![
            Call::Login("ana@example.com".to_string()),
            Call::List(TaskQuery::All),
        ]
    );
    assert_eq!(visible_ids(&state), vec![TaskId::from(1), TaskId::from(2)]);
}

#[tokio::test]
async fn test_done_and_pending_filter_client_side() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    login(&mut state, &api).await;

    let command = state.select_filter(StatusFilter::Done);
    drive(&mut state, &api, command).await.unwrap();
    assert_eq!(visible_ids(&state), vec![TaskId::from(2)]);

    let command = state.select_filter(StatusFilter::Pending);
    drive(&mut state, &api, command).await.unwrap();
    assert_eq!(visible_ids(&state), vec![TaskId::from(1)]);

    // Status modes never reach the server as a filter
    assert!(
        api.calls()
            .iter()
            .all(|c| !matches!(c, Call::List(TaskQuery::ByTag(_))))
    );
}

#[tokio::test]
async fn test_tag_filter_queries_server_then_reverts() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    login(&mut state, &api).await;

    state.tag_input = "home".to_string();
    let command = state.submit_tag_filter();
    drive(&mut state, &api, command).await.unwrap();

    assert_eq!(state.filter.mode(), FilterMode::Tag);
    assert_eq!(
        api.calls().last(),
        Some(&Call::List(TaskQuery::ByTag("home".to_string())))
    );
    assert_eq!(visible_ids(&state), vec![TaskId::from(1)]);

    let command = state.select_filter(StatusFilter::Pending);
    drive(&mut state, &api, command).await.unwrap();

    assert_eq!(state.filter.mode(), FilterMode::Pending);
    assert_eq!(state.filter.active_tag(), None);
    assert_eq!(api.calls().last(), Some(&Call::List(TaskQuery::All)));
    assert_eq!(visible_ids(&state), vec![TaskId::from(1)]);
}

#[tokio::test]
async fn test_add_sends_trimmed_body_and_appends() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    login(&mut state, &api).await;

    state.add_form.text = " buy milk ".to_string();
    state.add_form.tags = "home, ,urgent".to_string();
    let command = state.submit_add().unwrap();
    drive(&mut state, &api, command).await.unwrap();

    assert_eq!(
        api.calls().last(),
        Some(&Call::Create(NewTask::pending(
            "buy milk",
            vec!["home".to_string(), "urgent".to_string()]
        )))
    );
    let last = state.store.iter().last().unwrap();
    assert_eq!(last.id, TaskId::from(3));
    assert_eq!(last.text, "buy milk");
    assert!(state.add_form.text.is_empty());
    assert!(state.add_form.tags.is_empty());
}

#[tokio::test]
async fn test_blank_add_makes_no_request() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    login(&mut state, &api).await;
    let calls_before = api.calls().len();
    let store_before = state.store.clone();

    state.add_form.text = "   ".to_string();
    assert_eq!(state.submit_add().unwrap(), None);

    assert_eq!(api.calls().len(), calls_before);
    assert_eq!(state.store, store_before);
}

#[tokio::test]
async fn test_complete_replaces_only_that_entry() {
    let api = FakeService::new(vec![
        Task::new(1, "A", false),
        Task::new(2, "B", true),
        Task::new(3, "C", false),
    ]);
    let mut state = AppState::new();
    login(&mut state, &api).await;

    let command = state.complete(&TaskId::from(1)).unwrap();
    drive(&mut state, &api, command).await.unwrap();

    assert_eq!(
        state.store.as_slice(),
        &[
            Task::new(1, "A", true),
            Task::new(2, "B", true),
            Task::new(3, "C", false),
        ]
    );
}

#[tokio::test]
async fn test_failed_mutations_leave_store_unchanged() {
    let mut api = FakeService::new(seed());
    api.fail_mutations = true;
    let mut state = AppState::new();
    login(&mut state, &api).await;
    let before = state.store.clone();

    let command = state.complete(&TaskId::from(1)).unwrap();
    let err = drive(&mut state, &api, command).await.unwrap_err();
    assert!(matches!(err, TaskListError::MutationFailure(_)));

    state.add_form.text = "x".to_string();
    let command = state.submit_add().unwrap();
    let err = drive(&mut state, &api, command).await.unwrap_err();
    assert!(matches!(err, TaskListError::MutationFailure(_)));

    assert_eq!(state.store, before);
    assert!(state.is_authenticated());
}

#[tokio::test]
async fn test_only_latest_fetch_lands() {
    let api = FakeService::new(seed());
    let mut state = AppState::new();
    login(&mut state, &api).await;

    // Issue two fetches, then let them finish in reverse order
    state.tag_input = "work".to_string();
    let tag_fetch = state.submit_tag_filter().unwrap();
    let all_fetch = state.select_filter(StatusFilter::All).unwrap();

    let all_outcome = all_fetch.run(&api).await;
    let tag_outcome = tag_fetch.run(&api).await;

    state.apply(all_outcome).unwrap();
    state.apply(tag_outcome).unwrap();

    assert_eq!(state.filter.mode(), FilterMode::All);
    assert_eq!(visible_ids(&state), vec![TaskId::from(1), TaskId::from(2)]);
}
