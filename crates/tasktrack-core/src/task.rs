use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task identifier. `0` marks a task the store has not numbered yet.
pub type TaskId = u64;

pub const UNASSIGNED_ID: TaskId = 0;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    /// Accepts the persisted name in any case, with or without `-`/`_`
    /// separators (`InProgress`, `in-progress`, `in_progress`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_name(s);
        Self::ALL
            .into_iter()
            .find(|status| status.name().to_ascii_lowercase() == folded)
            .ok_or_else(|| CoreError::invalid("status", format!("'{}' is not a task status", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn name(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskPriority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_name(s);
        Self::ALL
            .into_iter()
            .find(|priority| priority.name().to_ascii_lowercase() == folded)
            .ok_or_else(|| {
                CoreError::invalid("priority", format!("'{}' is not a task priority", s))
            })
    }
}

fn fold_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_' && *c != ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A tracked task.
///
/// The store owns the authoritative copy; everything handed to callers is
/// a clone, so edits only take effect once passed back through an update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub creation_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Task {
    /// Create an unnumbered task with default status and priority.
    pub fn new(description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UNASSIGNED_ID,
            description: description.into(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            creation_date: now,
            last_modified_date: now,
            due_date: None,
            categories: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for category in categories {
            self.push_category(category.into());
        }
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    /// Stamp the modification time, never moving it before creation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified_date = now.max(self.creation_date);
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.touch(Utc::now());
    }

    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
        self.touch(Utc::now());
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
        self.touch(Utc::now());
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Append a category unless an identical one is present.
    ///
    /// Returns `true` when the category was added.
    pub fn add_category(&mut self, category: impl Into<String>) -> bool {
        let added = self.push_category(category.into());
        if added {
            self.touch(Utc::now());
        }
        added
    }

    pub fn remove_category(&mut self, category: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c != category);
        let removed = self.categories.len() != before;
        if removed {
            self.touch(Utc::now());
        }
        removed
    }

    /// Due strictly before `today`, and not already finished.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        let open = matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress);
        open && self.due_date.is_some_and(|due| due.date_naive() < today)
    }

    fn push_category(&mut self, category: String) -> bool {
        if self.has_category(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }
}
