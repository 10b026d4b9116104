//! Task command variants.
//!
//! Creation variants (single and bulk) share the resolution routines in
//! [`crate::resolve`] — project name-or-id lookup and assignee binding with
//! the contribute-rights re-check.

use async_trait::async_trait;
use serde_json::json;
use taskpilot_core::actor::Actor;
use taskpilot_core::command::{CommandDescriptor, CommandResult, ParamType, ParameterSpec};
use taskpilot_core::errors::CommandError;
use taskpilot_core::ids::{TaskId, UserId};
use taskpilot_core::params::{ParamMap, access};
use taskpilot_domain::types::{Task, TaskPatch, TaskStatus};
use tracing::debug;

use crate::resolve::{resolve_assignee, resolve_project};
use crate::traits::{Command, Services};

/// Parse a status parameter, naming the field in the failure.
fn parse_status(raw: &str, field: &'static str) -> Result<TaskStatus, CommandError> {
    TaskStatus::parse(raw).ok_or_else(|| CommandError::InvalidParameter {
        name: field.to_string(),
        expected: "status (Backlog, Todo, In Progress, Testing, Done)",
    })
}

/// Tasks visible to the actor, optionally narrowed to one project.
async fn visible_tasks(
    services: &Services,
    actor: &Actor,
    project_id: Option<&taskpilot_core::ids::ProjectId>,
) -> Result<Vec<Task>, CommandError> {
    let tasks = services
        .tasks
        .list_for_user(&actor.id)
        .await
        .map_err(CommandError::domain)?;
    Ok(match project_id {
        Some(pid) => tasks.into_iter().filter(|t| &t.project_id == pid).collect(),
        None => tasks,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// CREATE_TASK
// ─────────────────────────────────────────────────────────────────────────────

/// `CREATE_TASK` — create one task in a project the caller can contribute to.
pub struct CreateTaskCommand {
    services: Services,
}

impl CreateTaskCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for CreateTaskCommand {
    fn name(&self) -> &str {
        "CREATE_TASK"
    }

    fn description(&self) -> &str {
        "Create a task in a project (project by name or id; assignee by name or \"me\")"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param(
                "project",
                ParameterSpec::required(ParamType::String, "Project name or id"),
            )
            .with_param("title", ParameterSpec::required(ParamType::String, "Task title"))
            .with_param(
                "description",
                ParameterSpec::optional(ParamType::String, "Task details"),
            )
            .with_param(
                "assignee",
                ParameterSpec::optional(ParamType::String, "Assignee name, or \"me\""),
            )
    }

    async fn authorize(&self, actor: &Actor, params: &ParamMap) -> Result<bool, CommandError> {
        // Missing project falls through to execute's MissingParameter, which
        // is the clearer failure for the user.
        let Some(reference) = access::text(params, "project")? else {
            return Ok(true);
        };
        let project = resolve_project(&self.services, actor, reference).await?;
        self.services
            .projects
            .can_contribute(&actor.id, &project.id)
            .await
            .map_err(CommandError::domain)
    }

    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let reference = access::required_text(params, "project")?;
        let title = access::required_text(params, "title")?;
        let description = access::text(params, "description")?;

        let project = resolve_project(&self.services, actor, reference).await?;
        let assignee = match access::text(params, "assignee")? {
            Some(raw) => Some(resolve_assignee(&self.services, actor, &project, raw).await?),
            None => None,
        };

        let task = self
            .services
            .tasks
            .create(&project.id, title, description, assignee.as_ref())
            .await
            .map_err(CommandError::domain)?;

        Ok(CommandResult::ok(
            self.name(),
            format!("Created task \"{}\" in {}", task.title, project.name),
        )
        .with_data(json!({"taskId": task.id, "projectId": project.id}))
        .with_link("task", format!("/tasks/{}", task.id)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CREATE_TASKS (bulk)
// ─────────────────────────────────────────────────────────────────────────────

/// `CREATE_TASKS` — create several tasks at once in one project.
pub struct CreateTasksCommand {
    services: Services,
}

impl CreateTasksCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for CreateTasksCommand {
    fn name(&self) -> &str {
        "CREATE_TASKS"
    }

    fn description(&self) -> &str {
        "Create several tasks in one project, optionally all assigned to one person"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param(
                "project",
                ParameterSpec::required(ParamType::String, "Project name or id"),
            )
            .with_param(
                "titles",
                ParameterSpec::required(ParamType::List, "Task titles, one per task"),
            )
            .with_param(
                "assignee",
                ParameterSpec::optional(ParamType::String, "Assignee for every task, or \"me\""),
            )
    }

    async fn authorize(&self, actor: &Actor, params: &ParamMap) -> Result<bool, CommandError> {
        let Some(reference) = access::text(params, "project")? else {
            return Ok(true);
        };
        let project = resolve_project(&self.services, actor, reference).await?;
        self.services
            .projects
            .can_contribute(&actor.id, &project.id)
            .await
            .map_err(CommandError::domain)
    }

    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let reference = access::required_text(params, "project")?;
        let titles = access::required_text_list(params, "titles")?;

        let project = resolve_project(&self.services, actor, reference).await?;
        // Same binding rules as single create — resolved once, shared by all.
        let assignee = match access::text(params, "assignee")? {
            Some(raw) => Some(resolve_assignee(&self.services, actor, &project, raw).await?),
            None => None,
        };

        let mut created: Vec<TaskId> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        for title in &titles {
            match self
                .services
                .tasks
                .create(&project.id, title, None, assignee.as_ref())
                .await
            {
                Ok(task) => created.push(task.id),
                Err(err) => {
                    debug!(title, error = %err, "bulk task creation entry failed");
                    errors.push(format!("\"{title}\": {err}"));
                }
            }
        }

        let message = if errors.is_empty() {
            format!("Created {} task(s) in {}", created.len(), project.name)
        } else {
            format!(
                "Created {} task(s) in {}; {} failed ({})",
                created.len(),
                project.name,
                errors.len(),
                errors.join("; ")
            )
        };

        let mut result = CommandResult {
            command: self.name().to_string(),
            success: !created.is_empty() || errors.is_empty(),
            message,
            data: Some(json!({
                "taskIds": created,
                "totalCreated": created.len(),
                "totalErrors": errors.len(),
            })),
            links: None,
        };
        result = result.with_link("project", format!("/projects/{}", project.id));
        Ok(result)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UPDATE_TASK
// ─────────────────────────────────────────────────────────────────────────────

/// `UPDATE_TASK` — patch a task's title/description, or reassign it.
pub struct UpdateTaskCommand {
    services: Services,
}

impl UpdateTaskCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for UpdateTaskCommand {
    fn name(&self) -> &str {
        "UPDATE_TASK"
    }

    fn description(&self) -> &str {
        "Update a task's title, description, or assignee"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param("task_id", ParameterSpec::required(ParamType::String, "Task id"))
            .with_param("title", ParameterSpec::optional(ParamType::String, "New title"))
            .with_param(
                "description",
                ParameterSpec::optional(ParamType::String, "New description"),
            )
            .with_param(
                "assignee",
                ParameterSpec::optional(ParamType::String, "New assignee name, or \"me\""),
            )
    }

    async fn authorize(&self, actor: &Actor, params: &ParamMap) -> Result<bool, CommandError> {
        let Some(task_id) = access::text(params, "task_id")? else {
            return Ok(true);
        };
        self.services
            .tasks
            .can_manage(&actor.id, &TaskId::from_raw(task_id))
            .await
            .map_err(CommandError::domain)
    }

    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let task_id = TaskId::from_raw(access::required_text(params, "task_id")?);
        let patch = TaskPatch {
            title: access::text(params, "title")?.map(String::from),
            description: access::text(params, "description")?.map(String::from),
        };

        let mut task = self
            .services
            .tasks
            .update(&task_id, &patch)
            .await
            .map_err(CommandError::domain)?;

        if let Some(raw) = access::text(params, "assignee")? {
            // Reassignment binds through the same scoped-and-verified routine
            // as creation.
            let projects = self
                .services
                .projects
                .list_for_user(&actor.id)
                .await
                .map_err(CommandError::domain)?;
            let project = projects
                .into_iter()
                .find(|p| p.id == task.project_id)
                .ok_or_else(|| {
                    CommandError::domain(anyhow::anyhow!("You can no longer see this task's project"))
                })?;
            let assignee = resolve_assignee(&self.services, actor, &project, raw).await?;
            task = self
                .services
                .tasks
                .assign(&task_id, Some(&assignee))
                .await
                .map_err(CommandError::domain)?;
        }

        Ok(CommandResult::ok(self.name(), format!("Updated task \"{}\"", task.title))
            .with_data(json!({"taskId": task.id}))
            .with_link("task", format!("/tasks/{}", task.id)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UPDATE_TASK_STATUS
// ─────────────────────────────────────────────────────────────────────────────

/// `UPDATE_TASK_STATUS` — transition one task.
pub struct UpdateTaskStatusCommand {
    services: Services,
}

impl UpdateTaskStatusCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for UpdateTaskStatusCommand {
    fn name(&self) -> &str {
        "UPDATE_TASK_STATUS"
    }

    fn description(&self) -> &str {
        "Move a task to a new status"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param("task_id", ParameterSpec::required(ParamType::String, "Task id"))
            .with_param(
                "status",
                ParameterSpec::required(ParamType::String, "Target status"),
            )
    }

    async fn authorize(&self, actor: &Actor, params: &ParamMap) -> Result<bool, CommandError> {
        let Some(task_id) = access::text(params, "task_id")? else {
            return Ok(true);
        };
        self.services
            .tasks
            .can_manage(&actor.id, &TaskId::from_raw(task_id))
            .await
            .map_err(CommandError::domain)
    }

    async fn execute(&self, params: &ParamMap, _actor: &Actor) -> Result<CommandResult, CommandError> {
        let task_id = TaskId::from_raw(access::required_text(params, "task_id")?);
        let status = parse_status(access::required_text(params, "status")?, "status")?;

        let task = self
            .services
            .tasks
            .update_status(&task_id, status)
            .await
            .map_err(CommandError::domain)?;

        Ok(CommandResult::ok(
            self.name(),
            format!("Moved \"{}\" to {}", task.title, task.status),
        )
        .with_data(json!({"taskId": task.id, "status": task.status}))
        .with_link("task", format!("/tasks/{}", task.id)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BULK_UPDATE_STATUS
// ─────────────────────────────────────────────────────────────────────────────

/// `BULK_UPDATE_STATUS` — transition every matching task in a project.
///
/// Filters: `current_status` (only tasks currently there) and `assignee`
/// (`"me"`, `"unassigned"`, or a name within the project).
pub struct BulkUpdateStatusCommand {
    services: Services,
}

impl BulkUpdateStatusCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    async fn assignee_filter(
        &self,
        actor: &Actor,
        project: &taskpilot_domain::types::Project,
        raw: &str,
    ) -> Result<AssigneeFilter, CommandError> {
        if raw.eq_ignore_ascii_case("unassigned") {
            return Ok(AssigneeFilter::Unassigned);
        }
        if raw.eq_ignore_ascii_case("me") || raw.eq_ignore_ascii_case("myself") {
            return Ok(AssigneeFilter::User(actor.id.clone()));
        }
        // A filter only narrows the set — no contribute re-check needed,
        // unlike binding an assignment.
        let matches = self
            .services
            .users
            .find_by_name_in_project(&project.id, raw)
            .await
            .map_err(CommandError::domain)?;
        match matches.as_slice() {
            [one] => Ok(AssigneeFilter::User(one.id.clone())),
            [] => Err(CommandError::domain(anyhow::anyhow!(
                "No one named \"{raw}\" in {}",
                project.name
            ))),
            _ => Err(CommandError::domain(anyhow::anyhow!(
                "\"{raw}\" matches more than one person in {}",
                project.name
            ))),
        }
    }
}

enum AssigneeFilter {
    User(UserId),
    Unassigned,
}

impl AssigneeFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            Self::User(id) => task.assignee_id.as_ref() == Some(id),
            Self::Unassigned => task.assignee_id.is_none(),
        }
    }
}

#[async_trait]
impl Command for BulkUpdateStatusCommand {
    fn name(&self) -> &str {
        "BULK_UPDATE_STATUS"
    }

    fn description(&self) -> &str {
        "Move every matching task in a project to a new status"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param(
                "project",
                ParameterSpec::required(ParamType::String, "Project name or id"),
            )
            .with_param(
                "new_status",
                ParameterSpec::required(ParamType::String, "Target status"),
            )
            .with_param(
                "current_status",
                ParameterSpec::optional(ParamType::String, "Only tasks currently in this status"),
            )
            .with_param(
                "assignee",
                ParameterSpec::optional(
                    ParamType::String,
                    "Only tasks assigned to this person (\"me\", \"unassigned\", or a name)",
                ),
            )
    }

    async fn authorize(&self, actor: &Actor, params: &ParamMap) -> Result<bool, CommandError> {
        let Some(reference) = access::text(params, "project")? else {
            return Ok(true);
        };
        let project = resolve_project(&self.services, actor, reference).await?;
        self.services
            .projects
            .can_manage(&actor.id, &project.id)
            .await
            .map_err(CommandError::domain)
    }

    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let reference = access::required_text(params, "project")?;
        let new_status = parse_status(access::required_text(params, "new_status")?, "new_status")?;
        let current_status = match access::text(params, "current_status")? {
            Some(raw) => Some(parse_status(raw, "current_status")?),
            None => None,
        };

        let project = resolve_project(&self.services, actor, reference).await?;
        let assignee = match access::text(params, "assignee")? {
            Some(raw) => Some(self.assignee_filter(actor, &project, raw).await?),
            None => None,
        };

        let candidates: Vec<Task> = visible_tasks(&self.services, actor, Some(&project.id))
            .await?
            .into_iter()
            .filter(|t| current_status.is_none_or(|s| t.status == s))
            .filter(|t| assignee.as_ref().is_none_or(|f| f.matches(t)))
            .collect();

        let mut total_updated = 0usize;
        let mut total_errors = 0usize;
        for task in &candidates {
            match self.services.tasks.update_status(&task.id, new_status).await {
                Ok(_) => total_updated += 1,
                Err(err) => {
                    debug!(task_id = %task.id, error = %err, "bulk status entry failed");
                    total_errors += 1;
                }
            }
        }

        let message = if candidates.is_empty() {
            format!("No tasks in {} matched the filters", project.name)
        } else if total_errors == 0 {
            format!("Moved {total_updated} task(s) to {new_status} in {}", project.name)
        } else {
            format!(
                "Moved {total_updated} task(s) to {new_status} in {}; {total_errors} failed",
                project.name
            )
        };

        Ok(CommandResult::ok(self.name(), message)
            .with_data(json!({
                "totalUpdated": total_updated,
                "totalErrors": total_errors,
                "newStatus": new_status,
            }))
            .with_link("board", format!("/projects/{}/board", project.id)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LIST_TASKS
// ─────────────────────────────────────────────────────────────────────────────

/// `LIST_TASKS` — filtered task query across the caller's projects.
pub struct ListTasksCommand {
    services: Services,
}

impl ListTasksCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for ListTasksCommand {
    fn name(&self) -> &str {
        "LIST_TASKS"
    }

    fn description(&self) -> &str {
        "List tasks, optionally filtered by project, status, or \"me\" as assignee"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param(
                "project",
                ParameterSpec::optional(ParamType::String, "Project name or id"),
            )
            .with_param(
                "status",
                ParameterSpec::optional(ParamType::String, "Only tasks in this status"),
            )
            .with_param(
                "assignee",
                ParameterSpec::optional(ParamType::String, "\"me\" for the caller's tasks"),
            )
    }

    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let project = match access::text(params, "project")? {
            Some(reference) => Some(resolve_project(&self.services, actor, reference).await?),
            None => None,
        };
        let status = match access::text(params, "status")? {
            Some(raw) => Some(parse_status(raw, "status")?),
            None => None,
        };
        let mine_only = access::text(params, "assignee")?
            .is_some_and(|raw| raw.eq_ignore_ascii_case("me") || raw.eq_ignore_ascii_case("myself"));

        let tasks: Vec<Task> = visible_tasks(&self.services, actor, project.as_ref().map(|p| &p.id))
            .await?
            .into_iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .filter(|t| !mine_only || t.assignee_id.as_ref() == Some(&actor.id))
            .collect();

        let message = if tasks.is_empty() {
            "No tasks matched.".to_string()
        } else {
            let lines: Vec<_> = tasks
                .iter()
                .map(|t| format!("{} [{}]", t.title, t.status))
                .collect();
            format!("Found {} task(s): {}", tasks.len(), lines.join("; "))
        };

        Ok(CommandResult::ok(self.name(), message).with_data(json!({
            "tasks": tasks,
            "total": tasks.len(),
        })))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskpilot_domain::testutil::{InMemoryDirectory, Role};

    fn alice() -> Actor {
        Actor::new("user_alice", "Alice")
    }

    fn bob() -> Actor {
        Actor::new("user_bob", "Bob Woods")
    }

    fn setup() -> (Services, Arc<InMemoryDirectory>) {
        let dir = Arc::new(InMemoryDirectory::new().with_actor(alice()).with_actor(bob()));
        (Services::from_single(dir.clone()), dir)
    }

    fn params(entries: &[(&str, &str)]) -> ParamMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), taskpilot_core::params::ParamValue::from(*v)))
            .collect()
    }

    #[tokio::test]
    async fn create_task_resolves_project_by_name() {
        let (services, dir) = setup();
        let _ = dir.seed_project(&alice().id, "Marketing");
        let cmd = CreateTaskCommand::new(services);

        let result = cmd
            .execute(&params(&[("project", "marketing"), ("title", "Write copy")]), &alice())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Created task \"Write copy\" in Marketing");
        assert_eq!(dir.tasks().len(), 1);
    }

    #[tokio::test]
    async fn create_task_assigns_me() {
        let (services, dir) = setup();
        let _ = dir.seed_project(&alice().id, "Marketing");
        let cmd = CreateTaskCommand::new(services);

        let _ = cmd
            .execute(
                &params(&[("project", "Marketing"), ("title", "T"), ("assignee", "me")]),
                &alice(),
            )
            .await
            .unwrap();

        assert_eq!(dir.tasks()[0].assignee_id, Some(alice().id));
    }

    #[tokio::test]
    async fn create_task_authorize_requires_contribution() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        dir.grant(&project.id, &bob().id, Role::Viewer);
        let cmd = CreateTaskCommand::new(services);

        let allowed = cmd
            .authorize(&bob(), &params(&[("project", "Marketing"), ("title", "T")]))
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn bulk_create_shares_assignee() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        dir.grant(&project.id, &bob().id, Role::Contributor);
        let cmd = CreateTasksCommand::new(services);

        let mut p = params(&[("project", "Marketing"), ("assignee", "bob")]);
        let _ = p.insert(
            "titles".into(),
            taskpilot_core::params::ParamValue::List(vec!["A".into(), "B".into(), "C".into()]),
        );
        let result = cmd.execute(&p, &alice()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.data.as_ref().unwrap()["totalCreated"], 3);
        assert!(dir.tasks().iter().all(|t| t.assignee_id == Some(bob().id)));
    }

    #[tokio::test]
    async fn update_status_parses_loose_casing() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        let task = dir.seed_task(&project.id, "T", TaskStatus::Todo, None);
        let cmd = UpdateTaskStatusCommand::new(services);

        let result = cmd
            .execute(
                &params(&[("task_id", task.id.as_str()), ("status", "in progress")]),
                &alice(),
            )
            .await
            .unwrap();

        assert!(result.message.contains("In Progress"));
        assert_eq!(dir.tasks()[0].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn update_status_rejects_unknown_status() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        let task = dir.seed_task(&project.id, "T", TaskStatus::Todo, None);
        let cmd = UpdateTaskStatusCommand::new(services);

        let err = cmd
            .execute(&params(&[("task_id", task.id.as_str()), ("status", "shipped")]), &alice())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[tokio::test]
    async fn bulk_status_counts_matching_tasks_only() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        for i in 0..5 {
            let _ = dir.seed_task(&project.id, &format!("testing-{i}"), TaskStatus::Testing, None);
        }
        for i in 0..3 {
            let _ = dir.seed_task(&project.id, &format!("other-{i}"), TaskStatus::Todo, None);
        }
        let cmd = BulkUpdateStatusCommand::new(services);

        let result = cmd
            .execute(
                &params(&[
                    ("project", "Marketing"),
                    ("new_status", "Done"),
                    ("current_status", "Testing"),
                ]),
                &alice(),
            )
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["totalUpdated"], 5);
        assert_eq!(data["totalErrors"], 0);
        let done = dir.tasks().iter().filter(|t| t.status == TaskStatus::Done).count();
        assert_eq!(done, 5);
    }

    #[tokio::test]
    async fn bulk_status_authorize_requires_manage() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        dir.grant(&project.id, &bob().id, Role::Contributor);
        let cmd = BulkUpdateStatusCommand::new(services);

        let allowed = cmd
            .authorize(&bob(), &params(&[("project", "Marketing"), ("new_status", "Done")]))
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn bulk_status_no_matches_is_success() {
        let (services, dir) = setup();
        let _ = dir.seed_project(&alice().id, "Marketing");
        let cmd = BulkUpdateStatusCommand::new(services);

        let result = cmd
            .execute(&params(&[("project", "Marketing"), ("new_status", "Done")]), &alice())
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.message.contains("No tasks"));
    }

    #[tokio::test]
    async fn list_tasks_filters_status_and_assignee() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        let _ = dir.seed_task(&project.id, "Mine", TaskStatus::Todo, Some(&alice().id));
        let _ = dir.seed_task(&project.id, "Theirs", TaskStatus::Todo, Some(&bob().id));
        let _ = dir.seed_task(&project.id, "Done one", TaskStatus::Done, Some(&alice().id));
        let cmd = ListTasksCommand::new(services);

        let result = cmd
            .execute(&params(&[("status", "todo"), ("assignee", "me")]), &alice())
            .await
            .unwrap();

        assert_eq!(result.data.unwrap()["total"], 1);
        assert!(result.message.contains("Mine"));
    }

    #[tokio::test]
    async fn update_task_reassigns_with_verification() {
        let (services, dir) = setup();
        let project = dir.seed_project(&alice().id, "Marketing");
        dir.grant(&project.id, &bob().id, Role::Contributor);
        let task = dir.seed_task(&project.id, "T", TaskStatus::Todo, None);
        let cmd = UpdateTaskCommand::new(services);

        let result = cmd
            .execute(
                &params(&[
                    ("task_id", task.id.as_str()),
                    ("title", "Renamed"),
                    ("assignee", "bob"),
                ]),
                &alice(),
            )
            .await
            .unwrap();

        assert!(result.success);
        let stored = dir.tasks();
        assert_eq!(stored[0].title, "Renamed");
        assert_eq!(stored[0].assignee_id, Some(bob().id));
    }
}
