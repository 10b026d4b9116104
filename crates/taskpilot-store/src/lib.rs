//! # taskpilot-store
//!
//! SQLite persistence for conversation history: sessions (one per user
//! conversation, carrying the gateway continuation token) and turns (ordered
//! user/assistant entries with embedded command results).
//!
//! Layout follows a pooled-connection + stateless-repository split:
//!
//! - [`connection`]: r2d2 pool construction and schema migrations
//! - [`repositories`]: per-table repos, every method takes `&Connection`
//! - [`store::ConversationStore`]: the façade the runtime talks to
//!
//! ## Crate Position
//!
//! Depends on: taskpilot-core.
//! Depended on by: taskpilot-runtime.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod repositories;
pub mod row_types;
pub mod store;

pub use connection::{new_in_memory_pool, new_pool, Pool};
pub use errors::{Result, StoreError};
pub use store::ConversationStore;
