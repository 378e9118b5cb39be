use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tasklist_core::{
    AddField, ApiError, AppState, Command, Outcome, StatusFilter, TaskId, TaskListError,
};
use tracing::debug;

/// Input areas of the task screen, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    TagFilter,
    TaskText,
    TaskTags,
    List,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::TagFilter => Pane::TaskText,
            Pane::TaskText => Pane::TaskTags,
            Pane::TaskTags => Pane::List,
            Pane::List => Pane::TagFilter,
        }
    }

    fn previous(self) -> Self {
        match self {
            Pane::TagFilter => Pane::List,
            Pane::TaskText => Pane::TagFilter,
            Pane::TaskTags => Pane::TaskText,
            Pane::List => Pane::TaskTags,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum Action {
    Continue,
    Quit,
    Dispatch(Command),
}

impl From<Option<Command>> for Action {
    fn from(command: Option<Command>) -> Self {
        command.map_or(Action::Continue, Action::Dispatch)
    }
}

/// A Ctrl or Alt character chord. AltGr arrives as Ctrl+Alt and still types.
fn is_chord(key: &KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    matches!(key.code, KeyCode::Char(_)) && ctrl != alt
}

pub struct App {
    pub state: AppState,
    pub focus: Pane,
    /// Index into the visible tasks
    pub selected: usize,
    pub error_message: Option<String>,
    pub in_flight: usize,
}

impl Default for App {
    fn default() -> Self {
        Self {
            state: AppState::new(),
            focus: Pane::List,
            selected: 0,
            error_message: None,
            in_flight: 0,
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        // The error popup swallows the next key
        if self.error_message.take().is_some() {
            return Action::Continue;
        }

        if self.state.is_authenticated() {
            self.handle_task_key(key)
        } else {
            self.handle_login_key(key)
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> Action {
        if is_chord(&key) {
            return Action::Continue;
        }
        let form = &mut self.state.login_form;
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_focus(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => form.push_char(c),
            KeyCode::Enter => return self.state.submit_login().into(),
            _ => {}
        }
        Action::Continue
    }

    fn handle_task_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Action::Continue;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return Action::Continue;
            }
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.sign_out();
                self.focus = Pane::List;
                self.selected = 0;
                return Action::Continue;
            }
            _ => {}
        }

        if is_chord(&key) {
            debug!("Ignoring unbound chord {:?}", key);
            return Action::Continue;
        }

        match self.focus {
            Pane::TagFilter => self.handle_tag_key(key),
            Pane::TaskText => self.handle_add_key(key, AddField::Text),
            Pane::TaskTags => self.handle_add_key(key, AddField::Tags),
            Pane::List => self.handle_list_key(key),
        }
    }

    fn handle_tag_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char(c) => self.state.tag_input.push(c),
            KeyCode::Backspace => {
                self.state.tag_input.pop();
            }
            KeyCode::Enter => {
                self.selected = 0;
                return self.state.submit_tag_filter().into();
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_add_key(&mut self, key: KeyEvent, field: AddField) -> Action {
        match key.code {
            KeyCode::Char(c) => self.state.add_form.field_mut(field).push(c),
            KeyCode::Backspace => {
                self.state.add_form.field_mut(field).pop();
            }
            KeyCode::Enter => {
                let result = self.state.submit_add();
                return self.dispatch_or_report(result);
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('a') => self.select_filter(StatusFilter::All),
            KeyCode::Char('d') => self.select_filter(StatusFilter::Done),
            KeyCode::Char('p') => self.select_filter(StatusFilter::Pending),
            KeyCode::Char('r') => self.state.sync().into(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Action::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible_count() {
                    self.selected += 1;
                }
                Action::Continue
            }
            KeyCode::Enter | KeyCode::Char('c') => match self.selected_task_id() {
                Some(id) => {
                    let result = self.state.complete(&id);
                    self.dispatch_or_report(result)
                }
                None => Action::Continue,
            },
            _ => Action::Continue,
        }
    }

    fn select_filter(&mut self, status: StatusFilter) -> Action {
        self.selected = 0;
        self.state.select_filter(status).into()
    }

    fn dispatch_or_report(&mut self, result: Result<Option<Command>, TaskListError>) -> Action {
        match result {
            Ok(command) => command.into(),
            Err(e) => {
                self.error_message = Some(e.user_message());
                Action::Continue
            }
        }
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.state
            .visible_tasks()
            .nth(self.selected)
            .map(|task| task.id.clone())
    }

    pub fn visible_count(&self) -> usize {
        self.state.visible_tasks().count()
    }

    /// Merge a finished command into the state, returning any follow-up.
    pub fn apply(&mut self, outcome: Outcome) -> Option<Command> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let follow_up = match self.state.apply(outcome) {
            Ok(command) => command,
            // Shown inline on the login form
            Err(TaskListError::AuthFailure(_)) => None,
            Err(e) if e.api_error().is_some_and(ApiError::is_unauthorized) => None,
            Err(e) => {
                self.error_message = Some(e.user_message());
                None
            }
        };
        self.clamp_selection();
        follow_up
    }

    pub fn clamp_selection(&mut self) {
        let count = self.visible_count();
        if self.selected >= count {
            debug!("Clamping selection {} to {} row(s)", self.selected, count);
            self.selected = count.saturating_sub(1);
        }
    }
}
