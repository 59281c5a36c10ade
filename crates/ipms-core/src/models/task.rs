use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{SortOrder, TaskPriority, TaskSortField, TaskStatus};
use crate::patch;
use crate::validation::{self, ValidationResult};

/// A unit of work owned by a user, optionally inside a project.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Task {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Containing project.
    pub project_id: Option<i64>,
    /// Title, 1 to 100 characters.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Workflow state.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Set the first time the task reaches `done`.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task.
#[derive(Clone, Debug, Deserialize)]
pub struct TaskCreate {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial status; defaults to `todo`.
    #[serde(default)]
    pub status: TaskStatus,
    /// Priority; defaults to `medium`.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Deadline.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Containing project.
    #[serde(default)]
    pub project_id: Option<i64>,
}

impl TaskCreate {
    /// Check the title.
    pub fn validate(&self) -> ValidationResult {
        validation::title(&self.title)
    }
}

/// Partial task update. Nullable fields accept `null` to clear.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub description: Option<Option<String>>,
    /// New status.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// New deadline.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Move to another project or out of any project.
    #[serde(default, deserialize_with = "patch::double_option")]
    pub project_id: Option<Option<i64>>,
}

impl TaskUpdate {
    /// Check the title if present.
    pub fn validate(&self) -> ValidationResult {
        validation::title_opt(self.title.as_deref())
    }
}

impl Task {
    /// Merge `update` into this task.
    ///
    /// Moving to `done` stamps `completed_at` with `now` unless it is already
    /// set. Returns `true` when that stamp happened.
    pub fn apply(&mut self, update: TaskUpdate, now: DateTime<Utc>) -> bool {
        if let Some(title) = update.title {
            self.title = title;
        }
        patch::apply(&mut self.description, update.description);
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        patch::apply(&mut self.due_date, update.due_date);
        patch::apply(&mut self.project_id, update.project_id);

        let mut completed = false;
        if let Some(status) = update.status {
            self.status = status;
            if status == TaskStatus::Done && self.completed_at.is_none() {
                self.completed_at = Some(now);
                completed = true;
            }
        }
        completed
    }
}

/// Query parameters for listing tasks.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskFilter {
    /// Only tasks in this state.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    /// Due on or after.
    #[serde(default)]
    pub due_date_from: Option<DateTime<Utc>>,
    /// Due on or before.
    #[serde(default)]
    pub due_date_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of title or description.
    #[serde(default)]
    pub search: Option<String>,
    /// Sort column. Without it, newest first.
    #[serde(default)]
    pub sort_by: Option<TaskSortField>,
    /// Sort direction; defaults to ascending when `sort_by` is given.
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

/// Aggregate counts over a user's tasks.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskStats {
    /// All tasks.
    pub total: u64,
    /// Tasks in `done`.
    pub completed: u64,
    /// Open tasks past their due date.
    pub overdue: u64,
    /// Open tasks due within the next seven days.
    pub upcoming: u64,
    /// Count per status, every status present.
    pub by_status: BTreeMap<String, u64>,
    /// Count per priority, every priority present.
    pub by_priority: BTreeMap<String, u64>,
    /// `completed / total` as a percentage, 0 when there are no tasks.
    pub completion_rate: f64,
}

impl TaskStats {
    /// Empty stats with every status and priority key present.
    pub fn zeroed() -> Self {
        Self {
            by_status: TaskStatus::ALL
                .iter()
                .map(|s| (s.as_str().to_owned(), 0))
                .collect(),
            by_priority: TaskPriority::ALL
                .iter()
                .map(|p| (p.as_str().to_owned(), 0))
                .collect(),
            ..Self::default()
        }
    }

    /// Recompute `completion_rate` from `completed` and `total`.
    #[allow(clippy::cast_precision_loss)]
    pub fn finish(mut self) -> Self {
        self.completion_rate = if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        };
        self
    }
}
