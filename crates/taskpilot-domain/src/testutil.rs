//! Shared in-memory service double for command and runtime tests.
//!
//! Provides [`InMemoryDirectory`] — one struct implementing all four service
//! traits over mutexed maps, previously copy-pasted as partial mocks across
//! test modules. Thread-safe via `parking_lot::Mutex` so the `Send + Sync`
//! bounds on the traits are satisfied.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use taskpilot_core::actor::Actor;
use taskpilot_core::ids::{ProjectId, SprintId, TaskId, UserId};

use crate::errors::DomainError;
use crate::services::{DomainResult, ProjectService, SprintService, TaskService, UserDirectory};
use crate::types::{Project, Sprint, Task, TaskPatch, TaskStatus};

/// Membership role within a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Read-only access.
    Viewer,
    /// Can create and take tasks.
    Contributor,
    /// Full administration.
    Manager,
}

/// In-memory implementation of every domain service.
///
/// Supports builder-style seeding (`with_actor`, `seed_project`, `grant`,
/// `seed_task`) and a storage-failure switch for exercising `DomainError`
/// paths.
#[derive(Default)]
pub struct InMemoryDirectory {
    projects: Mutex<Vec<Project>>,
    tasks: Mutex<Vec<Task>>,
    sprints: Mutex<Vec<Sprint>>,
    members: Mutex<HashMap<(ProjectId, UserId), Role>>,
    actors: Mutex<Vec<Actor>>,
    fail_storage: AtomicBool,
}

impl InMemoryDirectory {
    /// Fresh, empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register an actor so name lookup can find them.
    #[must_use]
    pub fn with_actor(self, actor: Actor) -> Self {
        self.actors.lock().push(actor);
        self
    }

    /// Seed a project; the owner is registered as a manager.
    pub fn seed_project(&self, owner: &UserId, name: &str) -> Project {
        let project = Project {
            id: ProjectId::generate(),
            name: name.to_string(),
            description: None,
            owner_id: owner.clone(),
        };
        let _ = self
            .members
            .lock()
            .insert((project.id.clone(), owner.clone()), Role::Manager);
        self.projects.lock().push(project.clone());
        project
    }

    /// Grant a role in a project.
    pub fn grant(&self, project_id: &ProjectId, user: &UserId, role: Role) {
        let _ = self
            .members
            .lock()
            .insert((project_id.clone(), user.clone()), role);
    }

    /// Seed a task directly (bypasses permission checks).
    pub fn seed_task(
        &self,
        project_id: &ProjectId,
        title: &str,
        status: TaskStatus,
        assignee: Option<&UserId>,
    ) -> Task {
        let task = Task {
            id: TaskId::generate(),
            project_id: project_id.clone(),
            title: title.to_string(),
            description: None,
            status,
            assignee_id: assignee.cloned(),
        };
        self.tasks.lock().push(task.clone());
        task
    }

    /// Make every subsequent call fail with `DomainError::Storage`.
    pub fn fail_storage(&self, fail: bool) {
        self.fail_storage.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all tasks (assertion helper).
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    fn check_storage(&self) -> DomainResult<()> {
        if self.fail_storage.load(Ordering::SeqCst) {
            return Err(DomainError::Storage("simulated outage".into()));
        }
        Ok(())
    }

    fn role_of(&self, user: &UserId, project_id: &ProjectId) -> Option<Role> {
        self.members
            .lock()
            .get(&(project_id.clone(), user.clone()))
            .copied()
    }
}

#[async_trait]
impl ProjectService for InMemoryDirectory {
    async fn create(
        &self,
        owner: &UserId,
        name: &str,
        description: Option<&str>,
    ) -> DomainResult<Project> {
        self.check_storage()?;
        let mut project = self.seed_project(owner, name);
        if let Some(desc) = description {
            project.description = Some(desc.to_string());
            let mut projects = self.projects.lock();
            if let Some(stored) = projects.iter_mut().find(|p| p.id == project.id) {
                stored.description = Some(desc.to_string());
            }
        }
        Ok(project)
    }

    async fn update(
        &self,
        project_id: &ProjectId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> DomainResult<Project> {
        self.check_storage()?;
        let mut projects = self.projects.lock();
        let project = projects
            .iter_mut()
            .find(|p| &p.id == project_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "project",
                id: project_id.to_string(),
            })?;
        if let Some(name) = name {
            project.name = name.to_string();
        }
        if let Some(desc) = description {
            project.description = Some(desc.to_string());
        }
        Ok(project.clone())
    }

    async fn list_for_user(&self, user: &UserId) -> DomainResult<Vec<Project>> {
        self.check_storage()?;
        let members = self.members.lock();
        Ok(self
            .projects
            .lock()
            .iter()
            .filter(|p| members.contains_key(&(p.id.clone(), user.clone())))
            .cloned()
            .collect())
    }

    async fn can_access(&self, user: &UserId, project_id: &ProjectId) -> DomainResult<bool> {
        self.check_storage()?;
        Ok(self.role_of(user, project_id).is_some())
    }

    async fn can_manage(&self, user: &UserId, project_id: &ProjectId) -> DomainResult<bool> {
        self.check_storage()?;
        Ok(self.role_of(user, project_id) == Some(Role::Manager))
    }

    async fn can_contribute(&self, user: &UserId, project_id: &ProjectId) -> DomainResult<bool> {
        self.check_storage()?;
        Ok(matches!(
            self.role_of(user, project_id),
            Some(Role::Contributor | Role::Manager)
        ))
    }
}

#[async_trait]
impl TaskService for InMemoryDirectory {
    async fn create(
        &self,
        project_id: &ProjectId,
        title: &str,
        description: Option<&str>,
        assignee: Option<&UserId>,
    ) -> DomainResult<Task> {
        self.check_storage()?;
        if !self.projects.lock().iter().any(|p| &p.id == project_id) {
            return Err(DomainError::NotFound {
                entity: "project",
                id: project_id.to_string(),
            });
        }
        let mut task = self.seed_task(project_id, title, TaskStatus::Todo, assignee);
        if let Some(desc) = description {
            task.description = Some(desc.to_string());
            let mut tasks = self.tasks.lock();
            if let Some(stored) = tasks.iter_mut().find(|t| t.id == task.id) {
                stored.description = Some(desc.to_string());
            }
        }
        Ok(task)
    }

    async fn update(&self, task_id: &TaskId, patch: &TaskPatch) -> DomainResult<Task> {
        self.check_storage()?;
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == task_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "task",
                id: task_id.to_string(),
            })?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(desc) = &patch.description {
            task.description = Some(desc.clone());
        }
        Ok(task.clone())
    }

    async fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> DomainResult<Task> {
        self.check_storage()?;
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == task_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "task",
                id: task_id.to_string(),
            })?;
        task.status = status;
        Ok(task.clone())
    }

    async fn assign(&self, task_id: &TaskId, assignee: Option<&UserId>) -> DomainResult<Task> {
        self.check_storage()?;
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == task_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "task",
                id: task_id.to_string(),
            })?;
        task.assignee_id = assignee.cloned();
        Ok(task.clone())
    }

    async fn list_for_user(&self, user: &UserId) -> DomainResult<Vec<Task>> {
        self.check_storage()?;
        let members = self.members.lock();
        Ok(self
            .tasks
            .lock()
            .iter()
            .filter(|t| members.contains_key(&(t.project_id.clone(), user.clone())))
            .cloned()
            .collect())
    }

    async fn can_manage(&self, user: &UserId, task_id: &TaskId) -> DomainResult<bool> {
        self.check_storage()?;
        let task = {
            let tasks = self.tasks.lock();
            tasks.iter().find(|t| &t.id == task_id).cloned()
        };
        let Some(task) = task else {
            return Ok(false);
        };
        if task.assignee_id.as_ref() == Some(user) {
            return Ok(true);
        }
        Ok(self.role_of(user, &task.project_id) == Some(Role::Manager))
    }
}

#[async_trait]
impl SprintService for InMemoryDirectory {
    async fn create(
        &self,
        project_id: &ProjectId,
        name: &str,
        starts_on: Option<&str>,
        ends_on: Option<&str>,
    ) -> DomainResult<Sprint> {
        self.check_storage()?;
        let sprint = Sprint {
            id: SprintId::generate(),
            project_id: project_id.clone(),
            name: name.to_string(),
            starts_on: starts_on.map(String::from),
            ends_on: ends_on.map(String::from),
        };
        self.sprints.lock().push(sprint.clone());
        Ok(sprint)
    }

    async fn update(
        &self,
        sprint_id: &SprintId,
        name: Option<&str>,
        starts_on: Option<&str>,
        ends_on: Option<&str>,
    ) -> DomainResult<Sprint> {
        self.check_storage()?;
        let mut sprints = self.sprints.lock();
        let sprint = sprints
            .iter_mut()
            .find(|s| &s.id == sprint_id)
            .ok_or_else(|| DomainError::NotFound {
                entity: "sprint",
                id: sprint_id.to_string(),
            })?;
        if let Some(name) = name {
            sprint.name = name.to_string();
        }
        if let Some(starts) = starts_on {
            sprint.starts_on = Some(starts.to_string());
        }
        if let Some(ends) = ends_on {
            sprint.ends_on = Some(ends.to_string());
        }
        Ok(sprint.clone())
    }

    async fn list_for_project(&self, project_id: &ProjectId) -> DomainResult<Vec<Sprint>> {
        self.check_storage()?;
        Ok(self
            .sprints
            .lock()
            .iter()
            .filter(|s| &s.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_name_in_project(
        &self,
        project_id: &ProjectId,
        name: &str,
    ) -> DomainResult<Vec<Actor>> {
        self.check_storage()?;
        let needle = name.trim().to_lowercase();
        let members = self.members.lock();
        Ok(self
            .actors
            .lock()
            .iter()
            .filter(|actor| {
                members.contains_key(&(project_id.clone(), actor.id.clone()))
                    && actor.display_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}
