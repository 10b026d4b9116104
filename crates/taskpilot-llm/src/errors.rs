//! Gateway error taxonomy.

use thiserror::Error;

/// Failure talking to the AI gateway. Always pipeline-fatal — the
/// orchestrator fails fast before any command executes.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("gateway transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP response from the gateway.
    #[error("gateway API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Parsed provider message, or the raw body when unparsable.
        message: String,
    },

    /// The gateway throttled us (HTTP 429).
    #[error("gateway rate limited: {message}")]
    RateLimited {
        /// Provider message.
        message: String,
    },

    /// 2xx response whose body carried no recognizable text payload.
    #[error("gateway returned an unrecognized response shape")]
    MalformedResponse,
}
