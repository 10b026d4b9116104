//! Pipeline-fatal error taxonomy.
//!
//! Only pre-execution steps can abort a run; command failures stay local to
//! their invocation and never appear here.

use std::time::Duration;

use taskpilot_llm::GatewayError;
use thiserror::Error;

/// Errors that abort a pipeline run before any command executes.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input was blank after trimming.
    #[error("input is empty")]
    EmptyInput,

    /// Input exceeded the configured ceiling.
    #[error("input is too long ({length} chars, limit {limit})")]
    InputTooLong {
        /// Observed trimmed length.
        length: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// Per-user request budget exhausted for the current window.
    #[error("rate limit exceeded, retry in {retry_after:?}")]
    RateLimited {
        /// Positive wait until the window rolls over.
        retry_after: Duration,
    },

    /// The derivation call to the gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl PipelineError {
    /// User-facing message for a failed run.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => "Please tell me what you'd like to do.".to_string(),
            Self::InputTooLong { limit, .. } => {
                format!("That request is too long — please keep it under {limit} characters.")
            }
            Self::RateLimited { retry_after } => format!(
                "You're sending requests too quickly. Try again in {}s.",
                retry_after.as_secs().max(1)
            ),
            Self::Gateway(_) => {
                "I couldn't reach the assistant service. Please try again shortly.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_message_rounds_up() {
        let err = PipelineError::RateLimited {
            retry_after: Duration::from_millis(400),
        };
        assert!(err.user_message().contains("in 1s"));
    }
}
