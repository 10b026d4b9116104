//! # taskpilot-commands
//!
//! The pluggable command layer: a closed capability interface, a startup-time
//! registry, and the executor that runs derived invocations with per-command
//! failure isolation.
//!
//! - [`Command`]: the five-operation capability every variant implements
//! - [`registry::CommandRegistry`]: name → command, populated once at startup
//! - [`executor::CommandExecutor`]: authorize + execute, one failure never
//!   aborts the batch
//! - [`resolve`]: shared project/assignee resolution used by creation variants
//! - Variants: [`project`], [`task`], [`sprint`], [`report`]
//!
//! ## Crate Position
//!
//! Depends on: taskpilot-core, taskpilot-domain.
//! Depended on by: taskpilot-runtime.

#![deny(unsafe_code)]

pub mod executor;
pub mod project;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod sprint;
pub mod task;
pub mod traits;

pub use executor::CommandExecutor;
pub use registry::{CommandRegistry, RegistryError};
pub use traits::{Command, Services};

use std::sync::Arc;

/// Build the full production registry over the given services.
///
/// Called once at startup; registration failures here are programming errors
/// (two commands claiming one name), so they propagate.
pub fn build_registry(services: &Services) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(project::CreateProjectCommand::new(services.clone())))?;
    registry.register(Arc::new(project::ListProjectsCommand::new(services.clone())))?;
    registry.register(Arc::new(task::CreateTaskCommand::new(services.clone())))?;
    registry.register(Arc::new(task::CreateTasksCommand::new(services.clone())))?;
    registry.register(Arc::new(task::UpdateTaskCommand::new(services.clone())))?;
    registry.register(Arc::new(task::UpdateTaskStatusCommand::new(services.clone())))?;
    registry.register(Arc::new(task::BulkUpdateStatusCommand::new(services.clone())))?;
    registry.register(Arc::new(task::ListTasksCommand::new(services.clone())))?;
    registry.register(Arc::new(sprint::CreateSprintCommand::new(services.clone())))?;
    registry.register(Arc::new(report::ReportErrorCommand))?;
    Ok(registry)
}
