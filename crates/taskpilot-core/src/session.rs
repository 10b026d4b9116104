//! Conversation wire types.
//!
//! - [`Session`]: multi-turn continuity unit for one user
//! - [`Turn`]: one recorded user or assistant message within a session
//!
//! These are the shapes callers see; the SQLite row types live in
//! `taskpilot-store`.

use serde::{Deserialize, Serialize};

use crate::command::CommandResult;
use crate::ids::{SessionId, UserId};

/// A multi-turn continuity unit for one user's interaction.
///
/// Created lazily on first turn, mutated only by appending turns, deleted
/// only explicitly (cascading its turns).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID — also the continuation token handed back to callers.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// Continuation token for the external gateway conversation, if the
    /// gateway issued one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_session_id: Option<String>,
    /// ISO 8601 creation time.
    pub created_at: String,
    /// ISO 8601 last-activity time, advanced on every append.
    pub last_activity_at: String,
}

/// Who authored a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnAuthor {
    /// The end user.
    User,
    /// The orchestrator's synthesized reply.
    Assistant,
}

/// One immutable, ordered record inside a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    /// Author of this turn.
    pub author: TurnAuthor,
    /// Message text.
    pub text: String,
    /// Position within the session (0-based, append-only).
    pub sequence: u32,
    /// ISO 8601 creation time.
    pub created_at: String,
    /// Assistant turns only: whether the pipeline run succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Assistant turns only: number of commands executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_count: Option<u32>,
    /// Assistant turns only: structured per-command results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<CommandResult>>,
    /// Assistant turns only: end-to-end latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_omits_assistant_fields() {
        let turn = Turn {
            author: TurnAuthor::User,
            text: "create a project".into(),
            sequence: 0,
            created_at: "2026-01-01T00:00:00Z".into(),
            success: None,
            command_count: None,
            results: None,
            elapsed_ms: None,
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["author"], "user");
        assert!(json.get("success").is_none());
        assert!(json.get("results").is_none());
    }

    #[test]
    fn assistant_turn_round_trips() {
        let turn = Turn {
            author: TurnAuthor::Assistant,
            text: "Done.".into(),
            sequence: 1,
            created_at: "2026-01-01T00:00:01Z".into(),
            success: Some(true),
            command_count: Some(2),
            results: Some(vec![CommandResult::ok("CREATE_PROJECT", "Created")]),
            elapsed_ms: Some(412),
        };
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
    }
}
