//! `REPORT_ERROR` — the model's escape hatch.
//!
//! When derivation cannot map the input to real commands it emits this
//! instead; executing it surfaces the message as a failed result so the
//! reply synthesizer presents it like any other failure.

use async_trait::async_trait;
use taskpilot_core::actor::Actor;
use taskpilot_core::command::{CommandDescriptor, CommandResult, ParamType, ParameterSpec};
use taskpilot_core::errors::CommandError;
use taskpilot_core::params::{ParamMap, access};

use crate::traits::Command;

/// `REPORT_ERROR` — always "succeeds" at producing a failed result.
pub struct ReportErrorCommand;

#[async_trait]
impl Command for ReportErrorCommand {
    fn name(&self) -> &str {
        "REPORT_ERROR"
    }

    fn description(&self) -> &str {
        "Report that the request could not be mapped to any command"
    }

    fn descriptor(&self) -> CommandDescriptor {
        CommandDescriptor::new(self.name(), self.description()).with_param(
            "message",
            ParameterSpec::required(ParamType::String, "Why the request could not be handled"),
        )
    }

    async fn execute(&self, params: &ParamMap, _actor: &Actor) -> Result<CommandResult, CommandError> {
        let message = access::required_text(params, "message")?;
        Ok(CommandResult::failed(self.name(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::params::access::single;

    #[tokio::test]
    async fn execute_returns_failed_result() {
        let cmd = ReportErrorCommand;
        let actor = Actor::new("user_alice", "Alice");
        let result = cmd
            .execute(&single("message", "I couldn't find that project"), &actor)
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.message, "I couldn't find that project");
    }

    #[tokio::test]
    async fn missing_message_is_a_parameter_error() {
        let cmd = ReportErrorCommand;
        let actor = Actor::new("user_alice", "Alice");
        let err = cmd.execute(&ParamMap::new(), &actor).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: message");
    }
}
