use crate::model::{Task, TaskId};
use std::fmt;

/// Display model for one task in the list.
#[derive(Debug, Clone, Copy)]
pub struct TaskRow<'a> {
    task: &'a Task,
}

impl<'a> TaskRow<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self { task }
    }

    pub fn id(&self) -> &'a TaskId {
        &self.task.id
    }

    pub fn text(&self) -> &'a str {
        &self.task.text
    }

    pub fn is_done(&self) -> bool {
        self.task.done
    }

    /// Only pending tasks offer the "complete" action
    pub fn can_complete(&self) -> bool {
        !self.task.done
    }

    /// `[tags: a, b]`, or `None` for an untagged task
    pub fn tags_label(&self) -> Option<String> {
        if self.task.tags.is_empty() {
            None
        } else {
            Some(format!("[tags: {}]", self.task.tags.join(", ")))
        }
    }
}

impl fmt::Display for TaskRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())?;
        if let Some(tags) = self.tags_label() {
            write!(f, " {}", tags)?;
        }
        Ok(())
    }
}
