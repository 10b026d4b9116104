//! The pipeline orchestrator.
//!
//! One `handle` call is one sequential run: validate → throttle → session →
//! context → derive → execute → synthesize → persist → time. Only the rate
//! check and derivation can abort a run; everything downstream degrades (a
//! failed command becomes a failed result, a failed persistence becomes a
//! warning) and the caller always gets a [`Reply`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use taskpilot_commands::{CommandExecutor, CommandRegistry, Services};
use taskpilot_core::actor::Actor;
use taskpilot_core::command::CommandResult;
use taskpilot_core::ids::SessionId;
use taskpilot_core::session::Session;
use taskpilot_store::ConversationStore;
use tracing::{error, info, instrument, warn};

use crate::context::ContextResolver;
use crate::errors::PipelineError;
use crate::prompt::PromptBuilder;
use crate::rate_limiter::{RateDecision, RateLimiter};
use crate::settings::OrchestratorSettings;
use crate::strategy::{OrchestrationStrategy, StrategyInput};

/// What every `handle` call returns, success or failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Whether the run succeeded end to end (every executed command too).
    pub success: bool,
    /// Synthesized user-facing message.
    pub message: String,
    /// Session continuation token, when a session was available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Number of commands executed.
    pub commands_executed: u32,
    /// Per-command results in execution order.
    pub command_results: Vec<CommandResult>,
    /// End-to-end latency in milliseconds, always at least 1.
    pub processing_time_ms: u64,
}

/// The orchestration pipeline.
pub struct Orchestrator {
    settings: OrchestratorSettings,
    rate_limiter: RateLimiter,
    resolver: ContextResolver,
    prompt_builder: PromptBuilder,
    executor: CommandExecutor,
    store: ConversationStore,
    strategy: Arc<dyn OrchestrationStrategy>,
}

impl Orchestrator {
    /// Assemble the pipeline. Settings are validated (clamped) on the way in.
    #[must_use]
    pub fn new(
        mut settings: OrchestratorSettings,
        registry: Arc<CommandRegistry>,
        services: &Services,
        store: ConversationStore,
        strategy: Arc<dyn OrchestrationStrategy>,
    ) -> Self {
        settings.validate();
        let rate_limiter = RateLimiter::new(
            settings.requests_per_window,
            Duration::from_secs(settings.window_secs),
        );
        let resolver =
            ContextResolver::standard(services, Duration::from_secs(settings.context_ttl_secs));
        let prompt_builder = PromptBuilder::new(&registry.descriptors());
        Self {
            settings,
            rate_limiter,
            resolver,
            prompt_builder,
            executor: CommandExecutor::new(registry),
            store,
            strategy,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// Never returns an error: fatal pipeline failures are folded into a
    /// `{success: false}` reply with a user-facing message.
    #[instrument(skip_all, fields(user_id = %actor.id))]
    pub async fn handle(
        &self,
        raw_input: &str,
        actor: &Actor,
        session_token: Option<&SessionId>,
    ) -> Reply {
        let started = Instant::now();
        match self.run(raw_input, actor, session_token, started).await {
            Ok(reply) => {
                counter!("pipeline_runs_total", "outcome" => "ok").increment(1);
                histogram!("pipeline_duration_seconds").record(started.elapsed().as_secs_f64());
                reply
            }
            Err(err) => {
                let elapsed = elapsed_ms(started);
                error!(
                    user_id = %actor.id,
                    input_len = raw_input.chars().count(),
                    error = %err,
                    elapsed_ms = elapsed,
                    "pipeline run failed"
                );
                counter!("pipeline_runs_total", "outcome" => "error").increment(1);
                Reply {
                    success: false,
                    message: err.user_message(),
                    session_id: None,
                    commands_executed: 0,
                    command_results: Vec::new(),
                    processing_time_ms: elapsed,
                }
            }
        }
    }

    async fn run(
        &self,
        raw_input: &str,
        actor: &Actor,
        session_token: Option<&SessionId>,
        started: Instant,
    ) -> Result<Reply, PipelineError> {
        let input = raw_input.trim();
        if input.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        // The limit is a character count, not bytes.
        let input_chars = input.chars().count();
        if input_chars > self.settings.max_input_length {
            return Err(PipelineError::InputTooLong {
                length: input_chars,
                limit: self.settings.max_input_length,
            });
        }

        if let RateDecision::Limited { retry_after } = self.rate_limiter.check_and_record(&actor.id)
        {
            return Err(PipelineError::RateLimited { retry_after });
        }

        let session = self.resolve_session(actor, session_token);

        let context = self.resolver.resolve(actor).await;
        let prompt = self.prompt_builder.build(&context, input);
        let strategy_input = StrategyInput {
            input,
            prompt: &prompt,
            gateway_session: session
                .as_ref()
                .and_then(|s| s.gateway_session_id.as_deref()),
        };

        let derivation = self.strategy.derive(&strategy_input).await?;
        if let (Some(session), Some(token)) = (&session, &derivation.gateway_session_id) {
            if session.gateway_session_id.as_deref() != Some(token) {
                if let Err(err) = self.store.set_gateway_session(&session.id, token) {
                    warn!(error = %err, "failed to persist gateway session token");
                }
            }
        }

        let results = self.executor.execute_batch(&derivation.invocations, actor).await;
        // A command that ran may have changed what the context snapshot
        // reports, so the next request re-reads instead of serving the
        // cached sections.
        if results.iter().any(|r| r.success) {
            self.resolver.invalidate(&actor.id);
        }
        let success = results.iter().all(|r| r.success);
        let message = self
            .strategy
            .synthesize(&strategy_input, &derivation, &results)
            .await;

        let elapsed = elapsed_ms(started);
        if let Some(session) = &session {
            self.persist_exchange(session, input, &message, success, &results, elapsed);
        }

        info!(
            user_id = %actor.id,
            commands = results.len(),
            success,
            elapsed_ms = elapsed,
            "pipeline run complete"
        );

        Ok(Reply {
            success,
            message,
            session_id: session.map(|s| s.id),
            commands_executed: results.len() as u32,
            command_results: results,
            processing_time_ms: elapsed,
        })
    }

    /// Resolve the session for this run, never fatally.
    ///
    /// An unknown or foreign token falls back to a fresh session with a
    /// warning; a storage failure drops persistence for this run entirely.
    fn resolve_session(&self, actor: &Actor, token: Option<&SessionId>) -> Option<Session> {
        let resolved = match token {
            Some(token) => self.store.resume_session(token, &actor.id).and_then(|found| {
                match found {
                    Some(session) => Ok(session),
                    None => {
                        warn!(session_id = %token, "unknown session token, starting fresh");
                        self.store.start_session(&actor.id)
                    }
                }
            }),
            None => self.store.get_or_create_active(&actor.id),
        };
        match resolved {
            Ok(session) => Some(session),
            Err(err) => {
                error!(user_id = %actor.id, error = %err, "conversation store unavailable, run will not be persisted");
                None
            }
        }
    }

    /// Best-effort persistence of one user/assistant exchange.
    fn persist_exchange(
        &self,
        session: &Session,
        input: &str,
        message: &str,
        success: bool,
        results: &[CommandResult],
        elapsed: u64,
    ) {
        if let Err(err) = self.store.append_user_turn(&session.id, input) {
            warn!(session_id = %session.id, error = %err, "failed to persist user turn");
            return;
        }
        if let Err(err) =
            self.store
                .append_assistant_turn(&session.id, message, success, results, elapsed)
        {
            warn!(session_id = %session.id, error = %err, "failed to persist assistant turn");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis())
        .unwrap_or(u64::MAX)
        .max(1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
