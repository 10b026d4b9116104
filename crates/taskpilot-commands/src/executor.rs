//! Command executor — lookup → authorize → execute, failures isolated.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use taskpilot_core::actor::Actor;
use taskpilot_core::command::{CommandInvocation, CommandResult};
use taskpilot_core::errors::CommandError;
use taskpilot_core::params::check_required;
use tracing::{debug, info, instrument, warn};

use crate::registry::CommandRegistry;

/// Convert a `Duration` to milliseconds, rounding up (ceiling).
///
/// `Duration::as_millis()` truncates sub-millisecond values to 0, which makes
/// cheap commands (listing against a warm cache) report "0ms". Any non-zero
/// duration reports at least 1ms.
fn duration_ceil_ms(d: Duration) -> u64 {
    let micros = d.as_micros();
    if micros == 0 {
        return 0;
    }
    ((micros + 999) / 1000) as u64
}

/// Runs derived invocations strictly in order, isolating each failure into
/// that invocation's result.
///
/// Sequential on purpose: later commands may depend on earlier side effects
/// (a bulk status change following a creation), so there is no intra-batch
/// concurrency.
pub struct CommandExecutor {
    registry: Arc<CommandRegistry>,
}

impl CommandExecutor {
    /// Create an executor over a populated registry.
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this executor dispatches against.
    #[must_use]
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Execute a batch in derivation order. Always returns one result per
    /// invocation; never aborts early.
    #[instrument(skip_all, fields(batch_len = invocations.len(), user_id = %actor.id))]
    pub async fn execute_batch(
        &self,
        invocations: &[CommandInvocation],
        actor: &Actor,
    ) -> Vec<CommandResult> {
        let mut results = Vec::with_capacity(invocations.len());
        for invocation in invocations {
            results.push(self.execute_one(invocation, actor).await);
        }
        results
    }

    /// Execute a single invocation through lookup → authorize → execute.
    #[instrument(skip_all, fields(command = %invocation.name))]
    async fn execute_one(&self, invocation: &CommandInvocation, actor: &Actor) -> CommandResult {
        let start = Instant::now();
        let name = invocation.name.as_str();

        // 1. Look up the command — fail closed on unknown names.
        let Some(command) = self.registry.get(name) else {
            warn!(command = name, "unregistered command derived from input");
            counter!("commands_executed_total", "command" => name.to_string(), "outcome" => "not_found")
                .increment(1);
            return CommandResult::failed(
                name,
                CommandError::NotFound {
                    name: name.to_string(),
                }
                .to_string(),
            );
        };

        // 2. Keys the descriptor declares required must be present before
        // any authorization or domain work runs.
        let descriptor = command.descriptor();
        if let Err(err) = check_required(&invocation.parameters, &descriptor.required_params()) {
            debug!(command = name, error = %err, "declared-required parameter missing");
            counter!("commands_executed_total", "command" => name.to_string(), "outcome" => "error")
                .increment(1);
            return CommandResult::failed(name, err.to_string());
        }

        // 3. Authorization predicate over (actor, parameters).
        match command.authorize(actor, &invocation.parameters).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(command = name, user_id = %actor.id, "authorization denied");
                counter!("commands_executed_total", "command" => name.to_string(), "outcome" => "unauthorized")
                    .increment(1);
                return CommandResult::failed(
                    name,
                    CommandError::Unauthorized {
                        command: name.to_string(),
                    }
                    .to_string(),
                );
            }
            Err(err) => {
                debug!(command = name, error = %err, "authorization check failed");
                counter!("commands_executed_total", "command" => name.to_string(), "outcome" => "error")
                    .increment(1);
                return CommandResult::failed(name, err.to_string());
            }
        }

        // 4. Execute; any error becomes this invocation's failed result.
        let result = match command.execute(&invocation.parameters, actor).await {
            Ok(result) => result,
            Err(err) => {
                debug!(command = name, error = %err, "command execution failed");
                CommandResult::failed(name, err.to_string())
            }
        };

        let duration_ms = duration_ceil_ms(start.elapsed());
        let outcome = if result.success { "ok" } else { "failed" };
        counter!("commands_executed_total", "command" => name.to_string(), "outcome" => outcome)
            .increment(1);
        histogram!("command_duration_seconds", "command" => name.to_string())
            .record(start.elapsed().as_secs_f64());
        info!(command = name, outcome, duration_ms, "command executed");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use taskpilot_core::command::CommandDescriptor;
    use taskpilot_core::params::{ParamMap, access};

    // ── Test command implementations ──

    struct EchoCommand;

    #[async_trait]
    impl crate::Command for EchoCommand {
        fn name(&self) -> &str {
            "ECHO"
        }
        fn description(&self) -> &str {
            "Echoes a message"
        }
        fn descriptor(&self) -> CommandDescriptor {
            CommandDescriptor::new("ECHO", "Echoes a message")
        }
        async fn execute(
            &self,
            params: &ParamMap,
            _actor: &Actor,
        ) -> Result<CommandResult, CommandError> {
            let text = access::required_text(params, "text")?;
            Ok(CommandResult::ok("ECHO", text))
        }
    }

    struct DeniedCommand;

    #[async_trait]
    impl crate::Command for DeniedCommand {
        fn name(&self) -> &str {
            "DENIED"
        }
        fn description(&self) -> &str {
            "Always denies"
        }
        fn descriptor(&self) -> CommandDescriptor {
            CommandDescriptor::new("DENIED", "Always denies")
        }
        async fn authorize(&self, _actor: &Actor, _params: &ParamMap) -> Result<bool, CommandError> {
            Ok(false)
        }
        async fn execute(
            &self,
            _params: &ParamMap,
            _actor: &Actor,
        ) -> Result<CommandResult, CommandError> {
            unreachable!("execute must not run after a denial")
        }
    }

    struct LockedCommand;

    #[async_trait]
    impl crate::Command for LockedCommand {
        fn name(&self) -> &str {
            "LOCKED"
        }
        fn description(&self) -> &str {
            "Declares a required parameter and denies everyone"
        }
        fn descriptor(&self) -> CommandDescriptor {
            use taskpilot_core::command::{ParamType, ParameterSpec};
            CommandDescriptor::new("LOCKED", "Declares a required parameter and denies everyone")
                .with_param("target", ParameterSpec::required(ParamType::String, "Target"))
        }
        async fn authorize(&self, _actor: &Actor, _params: &ParamMap) -> Result<bool, CommandError> {
            Ok(false)
        }
        async fn execute(
            &self,
            _params: &ParamMap,
            _actor: &Actor,
        ) -> Result<CommandResult, CommandError> {
            unreachable!("execute must not run after a denial")
        }
    }

    struct ExplodingCommand;

    #[async_trait]
    impl crate::Command for ExplodingCommand {
        fn name(&self) -> &str {
            "EXPLODE"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn descriptor(&self) -> CommandDescriptor {
            CommandDescriptor::new("EXPLODE", "Always fails")
        }
        async fn execute(
            &self,
            _params: &ParamMap,
            _actor: &Actor,
        ) -> Result<CommandResult, CommandError> {
            Err(CommandError::domain(anyhow::anyhow!("backend down")))
        }
    }

    fn make_executor() -> CommandExecutor {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(EchoCommand)).unwrap();
        registry.register(Arc::new(DeniedCommand)).unwrap();
        registry.register(Arc::new(ExplodingCommand)).unwrap();
        registry.register(Arc::new(LockedCommand)).unwrap();
        CommandExecutor::new(Arc::new(registry))
    }

    fn actor() -> Actor {
        Actor::new("user_1", "Tester")
    }

    #[tokio::test]
    async fn successful_execution() {
        let executor = make_executor();
        let inv = CommandInvocation::new("ECHO", access::single("text", "hello"));
        let results = executor.execute_batch(&[inv], &actor()).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(results[0].message, "hello");
    }

    #[tokio::test]
    async fn unknown_command_fails_closed() {
        let executor = make_executor();
        let inv = CommandInvocation::new("NOPE", ParamMap::new());
        let results = executor.execute_batch(&[inv], &actor()).await;

        assert!(!results[0].success);
        assert!(results[0].message.contains("Unknown command: NOPE"));
    }

    #[tokio::test]
    async fn unknown_command_does_not_abort_siblings() {
        let executor = make_executor();
        let batch = vec![
            CommandInvocation::new("NOPE", ParamMap::new()),
            CommandInvocation::new("ECHO", access::single("text", "still ran")),
        ];
        let results = executor.execute_batch(&batch, &actor()).await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(results[1].message, "still ran");
    }

    #[tokio::test]
    async fn denial_is_local_and_ordered() {
        let executor = make_executor();
        let batch = vec![
            CommandInvocation::new("DENIED", ParamMap::new()),
            CommandInvocation::new("ECHO", access::single("text", "ok")),
        ];
        let results = executor.execute_batch(&batch, &actor()).await;

        assert!(!results[0].success);
        assert!(results[0].message.contains("not authorized"));
        assert!(results[1].success);
    }

    #[tokio::test]
    async fn execution_error_embeds_cause() {
        let executor = make_executor();
        let results = executor
            .execute_batch(&[CommandInvocation::new("EXPLODE", ParamMap::new())], &actor())
            .await;

        assert!(!results[0].success);
        assert!(results[0].message.contains("backend down"));
    }

    #[tokio::test]
    async fn missing_parameter_is_local_failure() {
        let executor = make_executor();
        let results = executor
            .execute_batch(&[CommandInvocation::new("ECHO", ParamMap::new())], &actor())
            .await;

        assert!(!results[0].success);
        assert!(results[0].message.contains("Missing required parameter: text"));
    }

    #[tokio::test]
    async fn declared_required_keys_are_checked_before_authorize() {
        let executor = make_executor();

        // Without the declared "target" key the descriptor check fires first,
        // before the always-deny authorize.
        let results = executor
            .execute_batch(&[CommandInvocation::new("LOCKED", ParamMap::new())], &actor())
            .await;
        assert!(!results[0].success);
        assert!(results[0].message.contains("Missing required parameter: target"));

        // With it present, authorization is the failure.
        let results = executor
            .execute_batch(
                &[CommandInvocation::new("LOCKED", access::single("target", "x"))],
                &actor(),
            )
            .await;
        assert!(!results[0].success);
        assert!(results[0].message.contains("not authorized"));
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_results() {
        let executor = make_executor();
        let results = executor.execute_batch(&[], &actor()).await;
        assert!(results.is_empty());
    }

    #[test]
    fn ceil_ms_rounds_up() {
        assert_eq!(duration_ceil_ms(Duration::ZERO), 0);
        assert_eq!(duration_ceil_ms(Duration::from_micros(1)), 1);
        assert_eq!(duration_ceil_ms(Duration::from_micros(1001)), 2);
        assert_eq!(duration_ceil_ms(Duration::from_millis(5)), 5);
    }
}
