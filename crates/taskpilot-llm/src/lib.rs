//! # taskpilot-llm
//!
//! The AI gateway client — the orchestrator's single network dependency.
//!
//! - [`GatewayClient`]: object-safe trait the runtime consumes
//! - [`HttpGatewayClient`]: `reqwest` implementation with timeout and
//!   provider error parsing
//! - [`types`]: request/reply wire shapes
//! - [`errors::GatewayError`]: transport/API failure taxonomy
//!
//! The gateway is opaque: a prompt goes in, free text comes out. Both the
//! `choices[].message.content` shape and the flat `output`/`response` shapes
//! are accepted, since deployments sit behind different proxies.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod types;

pub use client::{GatewayConfig, HttpGatewayClient};
pub use errors::GatewayError;
pub use types::{GatewayReply, GatewayRequest};

use async_trait::async_trait;

/// The external natural-language service converting prompts to free text.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Send one prompt and wait for the full reply.
    async fn complete(&self, request: &GatewayRequest) -> Result<GatewayReply, GatewayError>;
}
