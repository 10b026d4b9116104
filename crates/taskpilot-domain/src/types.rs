//! Domain entity types.

use serde::{Deserialize, Serialize};
use taskpilot_core::ids::{ProjectId, SprintId, TaskId, UserId};

/// Lifecycle status of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    Backlog,
    /// Planned for the current cycle.
    Todo,
    /// Being worked on.
    InProgress,
    /// In review/QA.
    Testing,
    /// Complete.
    Done,
}

impl TaskStatus {
    /// All statuses, in lifecycle order — used for the context enumeration.
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Testing,
        TaskStatus::Done,
    ];

    /// Parse a status from loosely-cased user/gateway text.
    ///
    /// Accepts the canonical names plus common phrasings ("in progress",
    /// "in-progress", "qa"). Returns `None` for anything else — callers
    /// surface that as an invalid parameter, not a default.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "backlog" => Some(Self::Backlog),
            "todo" | "to do" | "to-do" => Some(Self::Todo),
            "inprogress" | "in progress" | "in-progress" | "doing" => Some(Self::InProgress),
            "testing" | "in review" | "review" | "qa" => Some(Self::Testing),
            "done" | "complete" | "completed" | "finished" => Some(Self::Done),
            _ => None,
        }
    }

    /// Canonical display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Testing => "Testing",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project ID.
    pub id: ProjectId,
    /// Display name, unique per owner.
    pub name: String,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning user.
    pub owner_id: UserId,
}

/// A task within a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task ID.
    pub id: TaskId,
    /// Parent project.
    pub project_id: ProjectId,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Assigned user, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
}

/// A sprint within a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    /// Sprint ID.
    pub id: SprintId,
    /// Parent project.
    pub project_id: ProjectId,
    /// Display name ("Sprint 12").
    pub name: String,
    /// Optional ISO 8601 start date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_on: Option<String>,
    /// Optional ISO 8601 end date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<String>,
}

/// Fields a task update may change. `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
}
