//! Derivation and synthesis strategies.
//!
//! A strategy owns the two model-facing pipeline steps: turning input into
//! invocations and turning results into reply text. Two implementations:
//!
//! - [`SingleShotStrategy`]: one gateway call, template synthesis.
//! - [`ConversationalStrategy`]: carries the gateway session token forward,
//!   short-circuits short affirmatives into a continuation, and rewrites the
//!   template reply through a second gateway call (falling back to the
//!   template when that call fails — synthesis must not abort the run).

use std::sync::Arc;

use async_trait::async_trait;
use taskpilot_core::command::{CommandInvocation, CommandResult};
use taskpilot_llm::{GatewayClient, GatewayRequest};
use tracing::{debug, warn};

use crate::errors::PipelineError;
use crate::fallback::FallbackMatcher;
use crate::parser;
use crate::synthesizer::TemplateSynthesizer;

/// Everything a strategy sees about one pipeline run.
pub struct StrategyInput<'a> {
    /// Trimmed user input.
    pub input: &'a str,
    /// Fully rendered derivation prompt.
    pub prompt: &'a str,
    /// Stored gateway continuation token for this session, if any.
    pub gateway_session: Option<&'a str>,
}

/// Derivation outcome: invocations plus the token to persist.
#[derive(Debug)]
pub struct Derivation {
    /// Commands to execute, in order.
    pub invocations: Vec<CommandInvocation>,
    /// Gateway continuation token echoed by the reply, if any.
    pub gateway_session_id: Option<String>,
}

/// The interchangeable derivation + synthesis pair.
#[async_trait]
pub trait OrchestrationStrategy: Send + Sync {
    /// Derive invocations for this run. The only pipeline-fatal model step.
    async fn derive(&self, run: &StrategyInput<'_>) -> Result<Derivation, PipelineError>;

    /// Produce the reply text from executed results. Must not fail.
    async fn synthesize(
        &self,
        run: &StrategyInput<'_>,
        derivation: &Derivation,
        results: &[CommandResult],
    ) -> String;
}

fn parse_or_fallback(
    reply_text: &str,
    input: &str,
    fallback: &FallbackMatcher,
) -> Vec<CommandInvocation> {
    let invocations = parser::parse(reply_text);
    if !invocations.is_empty() {
        return invocations;
    }
    let matched = fallback.derive(input);
    if !matched.is_empty() {
        debug!(count = matched.len(), "gateway yielded no commands, fallback matched");
    }
    matched
}

/// One gateway call per run; template synthesis.
pub struct SingleShotStrategy {
    gateway: Arc<dyn GatewayClient>,
    model: String,
    fallback: FallbackMatcher,
}

impl SingleShotStrategy {
    /// Strategy over the given gateway and model.
    #[must_use]
    pub fn new(gateway: Arc<dyn GatewayClient>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            fallback: FallbackMatcher::standard(),
        }
    }
}

#[async_trait]
impl OrchestrationStrategy for SingleShotStrategy {
    async fn derive(&self, run: &StrategyInput<'_>) -> Result<Derivation, PipelineError> {
        let request = GatewayRequest::new_conversation(&self.model, run.prompt);
        let reply = self.gateway.complete(&request).await?;
        Ok(Derivation {
            invocations: parse_or_fallback(&reply.text, run.input, &self.fallback),
            gateway_session_id: reply.session_id,
        })
    }

    async fn synthesize(
        &self,
        _run: &StrategyInput<'_>,
        _derivation: &Derivation,
        results: &[CommandResult],
    ) -> String {
        TemplateSynthesizer::synthesize(results)
    }
}

/// Short confirmations that continue the previous gateway exchange.
const AFFIRMATIVES: &[&str] = &["yes", "y", "ok", "okay", "sure", "go ahead", "do it", "yes please"];

fn is_affirmative(input: &str) -> bool {
    let normalized = input.trim().trim_end_matches(['.', '!']).to_lowercase();
    AFFIRMATIVES.contains(&normalized.as_str())
}

/// Session-carrying strategy with conversational reply rewriting.
pub struct ConversationalStrategy {
    gateway: Arc<dyn GatewayClient>,
    model: String,
    fallback: FallbackMatcher,
}

impl ConversationalStrategy {
    /// Strategy over the given gateway and model.
    #[must_use]
    pub fn new(gateway: Arc<dyn GatewayClient>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            fallback: FallbackMatcher::standard(),
        }
    }
}

#[async_trait]
impl OrchestrationStrategy for ConversationalStrategy {
    async fn derive(&self, run: &StrategyInput<'_>) -> Result<Derivation, PipelineError> {
        let request = match run.gateway_session {
            // An affirmative with history is a continuation: the gateway
            // already holds the implied action and re-emits its commands.
            Some(token) if is_affirmative(run.input) => {
                debug!("affirmative input, continuing gateway conversation");
                GatewayRequest::continuation(&self.model, run.input, token)
            }
            Some(token) => GatewayRequest::continuation(&self.model, run.prompt, token),
            None => GatewayRequest::new_conversation(&self.model, run.prompt),
        };
        let reply = self.gateway.complete(&request).await?;
        Ok(Derivation {
            invocations: parse_or_fallback(&reply.text, run.input, &self.fallback),
            gateway_session_id: reply.session_id,
        })
    }

    async fn synthesize(
        &self,
        run: &StrategyInput<'_>,
        derivation: &Derivation,
        results: &[CommandResult],
    ) -> String {
        let template = TemplateSynthesizer::synthesize(results);

        let rewrite_prompt = format!(
            "Rewrite the following status report as one short, friendly reply to the \
             user's request {:?}. Keep every fact and link, add nothing.\n\n{template}",
            run.input
        );
        let token = derivation
            .gateway_session_id
            .as_deref()
            .or(run.gateway_session);
        let request = match token {
            Some(token) => GatewayRequest::continuation(&self.model, rewrite_prompt, token),
            None => GatewayRequest::new_conversation(&self.model, rewrite_prompt),
        };

        match self.gateway.complete(&request).await {
            Ok(reply) if !reply.text.trim().is_empty() => reply.text.trim().to_string(),
            Ok(_) => template,
            Err(err) => {
                warn!(error = %err, "conversational rewrite failed, using template reply");
                template
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
