//! Task-board entries, shared by every stage.

use super::RecordId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        })
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        })
    }
}

/// A task on one stage's board.
///
/// The backend answers with camelCase for some fields and snake_case for
/// others depending on the route, so both spellings are accepted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, alias = "projectNo")]
    pub project_no: Option<String>,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
}

impl Task {
    /// Calendar day of the due date. The backend may send a full timestamp;
    /// only the leading `YYYY-MM-DD` is significant.
    pub fn due_day(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?;
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Body of a task creation request.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub project_no: String,
    pub due_date: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            project_no: String::new(),
            due_date: String::new(),
        }
    }
}

/// Partial update body; only set fields are sent.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
