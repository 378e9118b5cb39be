//! Input buffers for the login and add-task forms.

use crate::model::{Credentials, NewTask};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password. Please try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Split a comma-separated tag list, trimming each tag and dropping blanks.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.focused_mut().pop();
    }

    /// Clear the previous error and hand out credentials, unless a field is
    /// left empty.
    pub fn submit(&mut self) -> Option<Credentials> {
        self.error = None;
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(Credentials::new(email, self.password.clone()))
    }

    /// Forget the password after a successful login.
    pub fn reset(&mut self) {
        self.password.clear();
        self.error = None;
        self.focus = LoginField::Email;
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password_len", &self.password.len())
            .field("focus", &self.focus)
            .field("error", &self.error)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddField {
    #[default]
    Text,
    Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTaskForm {
    pub text: String,
    pub tags: String,
}

impl AddTaskForm {
    pub fn field_mut(&mut self, field: AddField) -> &mut String {
        match field {
            AddField::Text => &mut self.text,
            AddField::Tags => &mut self.tags,
        }
    }

    /// The request body to send, or `None` when the text is blank.
    pub fn draft(&self) -> Option<NewTask> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        Some(NewTask::pending(text, parse_tags(&self.tags)))
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.tags.clear();
    }
}
