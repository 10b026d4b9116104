//! Shared name-or-id resolution.
//!
//! Single-create and bulk-create variants (and every filter that names a
//! project or person) go through these two routines instead of carrying
//! their own slightly-divergent copies.

use anyhow::anyhow;
use taskpilot_core::actor::Actor;
use taskpilot_core::errors::CommandError;
use taskpilot_core::ids::UserId;
use taskpilot_domain::types::Project;

use crate::traits::Services;

/// Resolve a project reference — an ID or a name — to a project the actor
/// can at least access.
///
/// Matching order: exact ID, exact name (case-insensitive), unique
/// case-insensitive substring. Anything else fails with a message naming
/// the reference, including the ambiguous-substring case.
pub async fn resolve_project(
    services: &Services,
    actor: &Actor,
    reference: &str,
) -> Result<Project, CommandError> {
    let reference = reference.trim();
    let projects = services
        .projects
        .list_for_user(&actor.id)
        .await
        .map_err(CommandError::domain)?;

    if let Some(project) = projects.iter().find(|p| p.id.as_str() == reference) {
        return Ok(project.clone());
    }

    let needle = reference.to_lowercase();
    if let Some(project) = projects.iter().find(|p| p.name.to_lowercase() == needle) {
        return Ok(project.clone());
    }

    let partial: Vec<_> = projects
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();
    match partial.as_slice() {
        [project] => Ok((*project).clone()),
        [] => Err(CommandError::domain(anyhow!(
            "No project matching \"{reference}\""
        ))),
        _ => Err(CommandError::domain(anyhow!(
            "\"{reference}\" matches more than one project — use the exact name"
        ))),
    }
}

/// Resolve an assignee reference to a user authorized in the project.
///
/// `"me"`/`"myself"` binds the caller. Anything else is a name lookup
/// scoped to the project. Either way the resolved user's contribute
/// permission is re-verified before binding — a substring name match alone
/// never authorizes an assignment.
pub async fn resolve_assignee(
    services: &Services,
    actor: &Actor,
    project: &Project,
    reference: &str,
) -> Result<UserId, CommandError> {
    let reference = reference.trim();

    let candidate = if reference.eq_ignore_ascii_case("me")
        || reference.eq_ignore_ascii_case("myself")
    {
        actor.clone()
    } else {
        let matches = services
            .users
            .find_by_name_in_project(&project.id, reference)
            .await
            .map_err(CommandError::domain)?;
        match matches.as_slice() {
            [one] => one.clone(),
            [] => {
                return Err(CommandError::domain(anyhow!(
                    "No one named \"{reference}\" in {}",
                    project.name
                )));
            }
            _ => {
                return Err(CommandError::domain(anyhow!(
                    "\"{reference}\" matches more than one person in {} — use a full name",
                    project.name
                )));
            }
        }
    };

    let allowed = services
        .projects
        .can_contribute(&candidate.id, &project.id)
        .await
        .map_err(CommandError::domain)?;
    if !allowed {
        return Err(CommandError::domain(anyhow!(
            "{} cannot take tasks in {}",
            candidate.display_name,
            project.name
        )));
    }
    Ok(candidate.id)
}
