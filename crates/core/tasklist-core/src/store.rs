use crate::filter::Filter;
use crate::model::{Task, TaskId};
use serde::{Deserialize, Serialize};

/// Tasks in arrival order. No dedup, no sorting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a fresh fetch
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn append(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Swap in the server's copy for every entry with the same id, keeping
    /// positions. Returns false if no entry matched.
    pub fn replace(&mut self, updated: Task) -> bool {
        let mut found = false;
        for task in self.tasks.iter_mut().filter(|t| t.id == updated.id) {
            *task = updated.clone();
            found = true;
        }
        found
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Tasks that pass the filter's client-side predicate
    pub fn visible<'a>(&'a self, filter: &'a Filter) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }
}

impl From<Vec<Task>> for TaskStore {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}
