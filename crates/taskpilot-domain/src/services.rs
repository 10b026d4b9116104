//! Collaborator service traits.
//!
//! All traits are object-safe (`async_trait`, `Send + Sync`) so commands can
//! hold them behind `Arc<dyn _>` the way the runtime wires them. Read methods
//! are expected to pre-filter by visibility: `list_for_user` never returns an
//! entity the user cannot at least access.

use async_trait::async_trait;
use taskpilot_core::actor::Actor;
use taskpilot_core::ids::{ProjectId, TaskId, UserId};

use crate::errors::DomainError;
use crate::types::{Project, Sprint, Task, TaskPatch, TaskStatus};

/// Result alias for service calls.
pub type DomainResult<T> = Result<T, DomainError>;

/// Project persistence and membership rules.
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Create a project owned by `owner`.
    async fn create(
        &self,
        owner: &UserId,
        name: &str,
        description: Option<&str>,
    ) -> DomainResult<Project>;

    /// Update name/description of an existing project.
    async fn update(
        &self,
        project_id: &ProjectId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> DomainResult<Project>;

    /// Projects visible to the user, most recently created first.
    async fn list_for_user(&self, user: &UserId) -> DomainResult<Vec<Project>>;

    /// Whether the user can read the project at all.
    async fn can_access(&self, user: &UserId, project_id: &ProjectId) -> DomainResult<bool>;

    /// Whether the user can administer the project (settings, sprints, bulk ops).
    async fn can_manage(&self, user: &UserId, project_id: &ProjectId) -> DomainResult<bool>;

    /// Whether the user can create/take tasks in the project.
    async fn can_contribute(&self, user: &UserId, project_id: &ProjectId) -> DomainResult<bool>;
}

/// Task persistence and rules.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Create a task.
    async fn create(
        &self,
        project_id: &ProjectId,
        title: &str,
        description: Option<&str>,
        assignee: Option<&UserId>,
    ) -> DomainResult<Task>;

    /// Patch title/description.
    async fn update(&self, task_id: &TaskId, patch: &TaskPatch) -> DomainResult<Task>;

    /// Transition a task's status.
    async fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> DomainResult<Task>;

    /// Assign (or unassign with `None`) a task.
    async fn assign(&self, task_id: &TaskId, assignee: Option<&UserId>) -> DomainResult<Task>;

    /// Tasks visible to the user across their projects.
    async fn list_for_user(&self, user: &UserId) -> DomainResult<Vec<Task>>;

    /// Whether the user can modify the task.
    async fn can_manage(&self, user: &UserId, task_id: &TaskId) -> DomainResult<bool>;
}

/// Sprint persistence.
#[async_trait]
pub trait SprintService: Send + Sync {
    /// Create a sprint in a project.
    async fn create(
        &self,
        project_id: &ProjectId,
        name: &str,
        starts_on: Option<&str>,
        ends_on: Option<&str>,
    ) -> DomainResult<Sprint>;

    /// Rename or re-date a sprint.
    async fn update(
        &self,
        sprint_id: &taskpilot_core::ids::SprintId,
        name: Option<&str>,
        starts_on: Option<&str>,
        ends_on: Option<&str>,
    ) -> DomainResult<Sprint>;

    /// Sprints in a project, newest first.
    async fn list_for_project(&self, project_id: &ProjectId) -> DomainResult<Vec<Sprint>>;
}

/// Name → user resolution within an authorization scope.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users in the project whose display name matches `name`
    /// (case-insensitive substring). May return several candidates; the
    /// caller decides how to disambiguate.
    async fn find_by_name_in_project(
        &self,
        project_id: &ProjectId,
        name: &str,
    ) -> DomainResult<Vec<Actor>>;
}
