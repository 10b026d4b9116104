//! The authenticated caller.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// The authenticated user a pipeline run executes on behalf of.
///
/// Carries only identity — authorization is decided per command against the
/// domain services, never from fields on the actor itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Stable user ID.
    pub id: UserId,
    /// Display name, used for "assign to me" sugar and log context.
    pub display_name: String,
}

impl Actor {
    /// Create an actor from an ID and display name.
    #[must_use]
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}
