//! Filter controller: which slice of the store is shown and what to fetch.

use crate::api::TaskQuery;
use crate::model::Task;
use serde::{Deserialize, Serialize};

/// The four mutually exclusive filter modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Done,
    Pending,
    Tag,
}

impl FilterMode {
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Done => "Done",
            FilterMode::Pending => "Pending",
            FilterMode::Tag => "Tag",
        }
    }
}

/// Modes that can be picked directly, without a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Done,
    Pending,
}

impl From<StatusFilter> for FilterMode {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => FilterMode::All,
            StatusFilter::Done => FilterMode::Done,
            StatusFilter::Pending => FilterMode::Pending,
        }
    }
}

/// Active filter mode plus the tag used in tag mode.
///
/// The tag is kept empty whenever the mode is not `Tag`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    mode: FilterMode,
    active_tag: String,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// The tag in effect, only present in tag mode
    pub fn active_tag(&self) -> Option<&str> {
        (self.mode == FilterMode::Tag && !self.active_tag.is_empty())
            .then_some(self.active_tag.as_str())
    }

    /// Switch to a status mode and drop any tag.
    ///
    /// Returns whether anything changed, i.e. whether a refetch is due.
    pub fn select(&mut self, status: StatusFilter) -> bool {
        let mode = FilterMode::from(status);
        let changed = self.mode != mode || !self.active_tag.is_empty();
        self.mode = mode;
        self.active_tag.clear();
        changed
    }

    /// Switch to tag mode with the trimmed input.
    ///
    /// Blank input is ignored. Returns whether anything changed.
    pub fn apply_tag(&mut self, input: &str) -> bool {
        let tag = input.trim();
        if tag.is_empty() {
            return false;
        }
        let changed = self.mode != FilterMode::Tag || self.active_tag != tag;
        self.mode = FilterMode::Tag;
        self.active_tag = tag.to_string();
        changed
    }

    /// Client-side predicate. Tag mode lets everything through because the
    /// server already scoped the list.
    pub fn matches(&self, task: &Task) -> bool {
        match self.mode {
            FilterMode::All | FilterMode::Tag => true,
            FilterMode::Done => task.done,
            FilterMode::Pending => !task.done,
        }
    }

    /// The list request this filter calls for
    pub fn query(&self) -> TaskQuery {
        match self.active_tag() {
            Some(tag) => TaskQuery::ByTag(tag.to_string()),
            None => TaskQuery::All,
        }
    }
}
