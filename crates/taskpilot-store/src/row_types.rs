//! Raw row shapes, one per table.
//!
//! Rows keep everything as SQLite-native scalars; conversion into the wire
//! types from `taskpilot-core` happens at the store façade, where JSON
//! payloads are decoded and enum columns parsed.

use taskpilot_core::command::CommandResult;
use taskpilot_core::ids::{SessionId, UserId};
use taskpilot_core::session::{Session, Turn, TurnAuthor};

use crate::errors::{Result, StoreError};

/// One row of the `sessions` table.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRow {
    /// `sess_`-prefixed ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Gateway continuation token, once issued.
    pub gateway_session_id: Option<String>,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 last-activity time.
    pub last_activity_at: String,
}

impl SessionRow {
    /// Convert into the wire type.
    #[must_use]
    pub fn into_session(self) -> Session {
        Session {
            id: SessionId::from_raw(self.id),
            user_id: UserId::from_raw(self.user_id),
            gateway_session_id: self.gateway_session_id,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}

/// One row of the `turns` table.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnRow {
    /// `turn_`-prefixed ID.
    pub id: String,
    /// Owning session ID.
    pub session_id: String,
    /// `"user"` or `"assistant"`.
    pub author: String,
    /// Message text.
    pub body: String,
    /// Position within the session.
    pub sequence: i64,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Assistant turns: run outcome.
    pub success: Option<bool>,
    /// Assistant turns: commands executed.
    pub command_count: Option<i64>,
    /// Assistant turns: JSON-encoded `Vec<CommandResult>`.
    pub results: Option<String>,
    /// Assistant turns: latency in milliseconds.
    pub elapsed_ms: Option<i64>,
}

impl TurnRow {
    /// Decode the row into the wire type, parsing the embedded results JSON.
    pub fn into_turn(self) -> Result<Turn> {
        let author = match self.author.as_str() {
            "user" => TurnAuthor::User,
            "assistant" => TurnAuthor::Assistant,
            other => {
                return Err(StoreError::Corrupt {
                    detail: format!("unknown turn author {other:?}"),
                })
            }
        };
        let results: Option<Vec<CommandResult>> = match self.results {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(Turn {
            author,
            text: self.body,
            sequence: u32::try_from(self.sequence).unwrap_or(u32::MAX),
            created_at: self.created_at,
            success: self.success,
            command_count: self
                .command_count
                .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
            results,
            elapsed_ms: self.elapsed_ms.map(|n| u64::try_from(n).unwrap_or(0)),
        })
    }
}
