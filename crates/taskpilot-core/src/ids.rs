//! Branded ID newtypes.
//!
//! Every entity ID is a prefixed uuid-v7 string (`sess_…`, `proj_…`) wrapped
//! in a newtype so IDs of different entities cannot be mixed up at compile
//! time. All newtypes serialize transparently as plain strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh ID (`concat!($prefix, "_<uuid7>")`).
            #[must_use]
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::now_v7()))
            }

            /// Wrap an existing ID string (no format validation — IDs from
            /// external systems keep whatever shape they arrived with).
            #[must_use]
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

branded_id!(
    /// Identifies an authenticated user.
    UserId, "user"
);
branded_id!(
    /// Identifies a conversation session.
    SessionId, "sess"
);
branded_id!(
    /// Identifies a project.
    ProjectId, "proj"
);
branded_id!(
    /// Identifies a task.
    TaskId, "task"
);
branded_id!(
    /// Identifies a sprint.
    SprintId, "sprint"
);
