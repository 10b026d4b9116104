//! Sprint commands.

use async_trait::async_trait;
use serde_json::json;
use taskpilot_core::actor::Actor;
use taskpilot_core::command::{CommandDescriptor, CommandResult, ParamType, ParameterSpec};
use taskpilot_core::errors::CommandError;
use taskpilot_core::params::{ParamMap, access};

use crate::resolve::resolve_project;
use crate::traits::{Command, Services};

/// `CREATE_SPRINT` — create a sprint in a project the caller manages.
///
/// Dates are passed through as opaque ISO strings; the domain service owns
/// validation and ordering rules.
pub struct CreateSprintCommand {
    services: Services,
}

impl CreateSprintCommand {
    /// Wire the command to its services.
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Command for CreateSprintCommand {
    fn name(&self) -> &str {
        "CREATE_SPRINT"
    }

    fn description(&self) -> &str {
        "Create a sprint in a project, optionally with start and end dates"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description())
            .with_param(
                "project",
                ParameterSpec::required(ParamType::String, "Project name or id"),
            )
            .with_param("name", ParameterSpec::required(ParamType::String, "Sprint name"))
            .with_param(
                "start_date",
                ParameterSpec::optional(ParamType::String, "First day (YYYY-MM-DD)"),
            )
            .with_param(
                "end_date",
                ParameterSpec::optional(ParamType::String, "Last day (YYYY-MM-DD)"),
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
        let name = access::required_text(params, "name")?;
        let starts_on = access::text(params, "start_date")?;
        let ends_on = access::text(params, "end_date")?;

        let project = resolve_project(&self.services, actor, reference).await?;
        let sprint = self
            .services
            .sprints
            .create(&project.id, name, starts_on, ends_on)
            .await
            .map_err(CommandError::domain)?;

        Ok(CommandResult::ok(
            self.name(),
            format!("Created sprint \"{}\" in {}", sprint.name, project.name),
        )
        .with_data(json!({"sprintId": sprint.id, "projectId": project.id}))
        .with_link("sprint", format!("/sprints/{}", sprint.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskpilot_domain::testutil::{InMemoryDirectory, Role};

    fn alice() -> Actor {
        Actor::new("user_alice", "Alice")
    }

    fn params(entries: &[(&str, &str)]) -> ParamMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), taskpilot_core::params::ParamValue::from(*v)))
            .collect()
    }

    #[tokio::test]
    async fn creates_sprint_with_dates() {
        let dir = Arc::new(InMemoryDirectory::new().with_actor(alice()));
        let _ = dir.seed_project(&alice().id, "Marketing");
        let cmd = CreateSprintCommand::new(Services::from_single(dir));

        let result = cmd
            .execute(
                &params(&[
                    ("project", "Marketing"),
                    ("name", "Sprint 1"),
                    ("start_date", "2026-09-01"),
                    ("end_date", "2026-09-14"),
                ]),
                &alice(),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.message, "Created sprint \"Sprint 1\" in Marketing");
        assert!(result.links.unwrap().contains_key("sprint"));
    }

    #[tokio::test]
    async fn contributors_cannot_create_sprints() {
        let bob = Actor::new("user_bob", "Bob Woods");
        let dir = Arc::new(InMemoryDirectory::new().with_actor(alice()).with_actor(bob.clone()));
        let project = dir.seed_project(&alice().id, "Marketing");
        dir.grant(&project.id, &bob.id, Role::Contributor);
        let cmd = CreateSprintCommand::new(Services::from_single(dir));

        let allowed = cmd
            .authorize(&bob, &params(&[("project", "Marketing"), ("name", "Sprint 1")]))
            .await
            .unwrap();
        assert!(!allowed);
    }
}
