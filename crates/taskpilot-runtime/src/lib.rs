//! # taskpilot-runtime
//!
//! The orchestration pipeline tying everything together: input validation,
//! per-user throttling, context resolution, command derivation (gateway +
//! parser + deterministic fallback), isolated execution, reply synthesis,
//! and best-effort conversation persistence.
//!
//! - [`orchestrator::Orchestrator`]: the pipeline; [`orchestrator::Reply`]
//!   is what every call returns
//! - [`strategy`]: single-shot and conversational derivation/synthesis
//! - [`parser`] / [`fallback`]: gateway text → invocations
//! - [`context`]: per-user prompt context with provider fault isolation
//! - [`rate_limiter`]: fixed-window per-user throttle
//! - [`settings::OrchestratorSettings`]: tunable limits
//!
//! ## Crate Position
//!
//! Depends on: every other taskpilot crate.

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod fallback;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod rate_limiter;
pub mod settings;
pub mod strategy;
pub mod synthesizer;

pub use errors::PipelineError;
pub use orchestrator::{Orchestrator, Reply};
pub use settings::OrchestratorSettings;
pub use strategy::{ConversationalStrategy, OrchestrationStrategy, SingleShotStrategy};
