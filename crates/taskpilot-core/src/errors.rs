//! Command-local error taxonomy.
//!
//! These errors are isolated into a single invocation's [`crate::command::CommandResult`]
//! by the executor — they never abort sibling invocations. The pipeline-fatal
//! taxonomy (`EmptyInput`, `InputTooLong`, `RateLimited`, gateway failures)
//! lives in `taskpilot-runtime`, which owns the pipeline.

use thiserror::Error;

/// A failure scoped to one command invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The invocation named a command the registry does not know.
    #[error("Unknown command: {name}")]
    NotFound {
        /// Name as derived from input.
        name: String,
    },

    /// The command's authorization predicate denied the caller.
    #[error("You are not authorized to run {command}")]
    Unauthorized {
        /// Command that was denied.
        command: String,
    },

    /// A declared-required parameter was absent (or blank).
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },

    /// A parameter was present but the wrong shape.
    #[error("Parameter {name} must be a {expected}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What the command expected.
        expected: &'static str,
    },

    /// A domain service failed while the command was executing.
    #[error("{0}")]
    Domain(#[from] anyhow::Error),
}

impl CommandError {
    /// Wrap an arbitrary domain failure.
    pub fn domain(err: impl Into<anyhow::Error>) -> Self {
        Self::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let err = CommandError::NotFound {
            name: "NUKE_EVERYTHING".into(),
        };
        assert_eq!(err.to_string(), "Unknown command: NUKE_EVERYTHING");

        let err = CommandError::MissingParameter { name: "title".into() };
        assert_eq!(err.to_string(), "Missing required parameter: title");
    }
}
