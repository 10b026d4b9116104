//! The command capability interface and its service bundle.

use std::sync::Arc;

use async_trait::async_trait;
use taskpilot_core::actor::Actor;
use taskpilot_core::command::{CommandDescriptor, CommandResult};
use taskpilot_core::errors::CommandError;
use taskpilot_core::params::ParamMap;
use taskpilot_domain::{ProjectService, SprintService, TaskService, UserDirectory};

/// Handles to the domain collaborators a command may need.
///
/// Cloning is cheap (`Arc` per service); each command keeps its own copy so
/// the registry owns self-contained trait objects.
#[derive(Clone)]
pub struct Services {
    /// Project persistence and membership rules.
    pub projects: Arc<dyn ProjectService>,
    /// Task persistence and rules.
    pub tasks: Arc<dyn TaskService>,
    /// Sprint persistence.
    pub sprints: Arc<dyn SprintService>,
    /// Name → user resolution within a project scope.
    pub users: Arc<dyn UserDirectory>,
}

impl Services {
    /// Bundle four separately-implemented services.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectService>,
        tasks: Arc<dyn TaskService>,
        sprints: Arc<dyn SprintService>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            projects,
            tasks,
            sprints,
            users,
        }
    }

    /// Bundle a single object implementing all four traits (the in-memory
    /// test double, or a monolithic client in small deployments).
    #[must_use]
    pub fn from_single<T>(service: Arc<T>) -> Self
    where
        T: ProjectService + TaskService + SprintService + UserDirectory + 'static,
    {
        Self {
            projects: service.clone(),
            tasks: service.clone(),
            sprints: service.clone(),
            users: service,
        }
    }
}

/// A typed, self-describing domain operation.
///
/// The uniform capability set every variant implements. The schema returned
/// by [`Command::descriptor`] is advisory — it drives prompting, while
/// `execute` re-validates the parameters it actually consumes.
#[async_trait]
pub trait Command: Send + Sync {
    /// Globally unique name (`CREATE_PROJECT`).
    fn name(&self) -> &str;

    /// One-line description for the catalog.
    fn description(&self) -> &str;

    /// Static metadata advertised to the gateway.
    fn descriptor(&self) -> CommandDescriptor;

    /// Whether the actor may run this command with these parameters.
    ///
    /// Default: any authenticated actor. Variants narrow by ownership or
    /// membership. A `false` is reported as an authorization failure on the
    /// invocation's result; an `Err` is a domain failure, reported the same
    /// way.
    async fn authorize(&self, _actor: &Actor, _params: &ParamMap) -> Result<bool, CommandError> {
        Ok(true)
    }

    /// Execute the command.
    ///
    /// Absent declared-required keys fail with
    /// [`CommandError::MissingParameter`]; domain failures are converted by
    /// the executor into a failed [`CommandResult`], never propagated past
    /// this one invocation.
    async fn execute(&self, params: &ParamMap, actor: &Actor) -> Result<CommandResult, CommandError>;
}
