//! Project command variants.

use async_trait::async_trait;
use serde_json::json;
use taskpilot_core::actor::Actor;
use taskpilot_core::command::{CommandDescriptor, CommandResult, ParamType, ParameterSpec};
use taskpilot_core::errors::CommandError;
use taskpilot_core::params::{ParamMap, access};

use crate::traits::{Command, Services};

/// `CREATE_PROJECT` — create a project owned by the caller.
pub struct CreateProjectCommand {
    services: Services,
}

impl CreateProjectCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for CreateProjectCommand {
    fn name(&self) -> &str {
        "CREATE_PROJECT"
    }

    fn description(&self) -> &str {
        "Create a new project owned by the requesting user"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param("name", ParameterSpec::required(ParamType::String, "Project name"))
            .with_param(
                "description",
                ParameterSpec::optional(ParamType::String, "What the project is about"),
            )
    }

    // Any authenticated user may create a project — default authorize.

    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let name = access::required_text(params, "name")?;
        let description = access::text(params, "description")?;

        let project = self
            .services
            .projects
            .create(&actor.id, name, description)
            .await
            .map_err(CommandError::domain)?;

        Ok(
            CommandResult::ok(self.name(), format!("Created project \"{}\"", project.name))
                .with_data(json!({"projectId": project.id}))
                .with_link("project", format!("/projects/{}", project.id)),
        )
    }
}

/// `LIST_PROJECTS` — list the caller's visible projects.
pub struct ListProjectsCommand {
    services: Services,
}

impl ListProjectsCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for ListProjectsCommand {
    fn name(&self) -> &str {
        "LIST_PROJECTS"
    }

    fn description(&self) -> &str {
        "List the projects the requesting user can see"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
    }

    async fn execute(&self, _params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError> {
        let projects = self
            .services
            .projects
            .list_for_user(&actor.id)
            .await
            .map_err(CommandError::domain)?;

        let message = if projects.is_empty() {
            "You have no projects yet.".to_string()
        } else {
            let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
            format!("You have {} project(s): {}", projects.len(), names.join(", "))
        };

        Ok(CommandResult::ok(self.name(), message).with_data(json!({
            "projects": projects,
            "total": projects.len(),
        })))
    }
}
