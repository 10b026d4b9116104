//! Store error taxonomy.

use thiserror::Error;

/// Errors from the conversation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite-level failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool exhausted or broken.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Row lookup by ID came up empty where the caller required one.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("session", "turn").
        entity: &'static str,
        /// The ID that missed.
        id: String,
    },

    /// Embedded JSON payload failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored column held a value outside its expected vocabulary.
    #[error("corrupt row: {detail}")]
    Corrupt {
        /// What was wrong.
        detail: String,
    },
}

/// Store result alias.
pub type Result<T> = std::result::Result<T, StoreError>;
