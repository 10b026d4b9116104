//! The store façade the runtime talks to.

use std::path::Path;

use taskpilot_core::command::CommandResult;
use taskpilot_core::ids::{SessionId, UserId};
use taskpilot_core::session::{Session, Turn};
use tracing::debug;

use crate::connection::{Pool, new_in_memory_pool, new_pool};
use crate::errors::Result;
use crate::repositories::{AppendTurnOptions, SessionRepo, TurnRepo};
use crate::row_types::{SessionRow, TurnRow};

/// Conversation persistence over a pooled SQLite database.
///
/// Every method checks out a connection, runs one repository call (or a
/// short sequence), and returns wire types. Appends advance the owning
/// session's last-activity timestamp.
#[derive(Clone)]
pub struct ConversationStore {
    pool: Pool,
}

impl ConversationStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Open a file-backed store, migrating the schema.
    pub fn open(path: &Path, max_size: u32) -> Result<Self> {
        Ok(Self::new(new_pool(path, max_size)?))
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(new_in_memory_pool()?))
    }

    /// Start a fresh session for a user.
    pub fn start_session(&self, user: &UserId) -> Result<Session> {
        let conn = self.pool.get()?;
        let row = SessionRepo::create(&conn, user.as_str())?;
        debug!(session_id = %row.id, user_id = %user, "session started");
        Ok(row.into_session())
    }

    /// Most recently active session for a user, or a fresh one.
    pub fn get_or_create_active(&self, user: &UserId) -> Result<Session> {
        {
            let conn = self.pool.get()?;
            if let Some(row) = SessionRepo::list_for_user(&conn, user.as_str())?.into_iter().next() {
                return Ok(row.into_session());
            }
        }
        self.start_session(user)
    }

    /// Resume a session by token, verifying ownership.
    ///
    /// Returns `None` for an unknown token or one belonging to another user;
    /// the caller decides whether that means a fresh session.
    pub fn resume_session(&self, session_id: &SessionId, user: &UserId) -> Result<Option<Session>> {
        let conn = self.pool.get()?;
        let Some(row) = SessionRepo::get_by_id(&conn, session_id.as_str())? else {
            return Ok(None);
        };
        if row.user_id != user.as_str() {
            debug!(session_id = %session_id, "session token presented by non-owner");
            return Ok(None);
        }
        Ok(Some(row.into_session()))
    }

    /// Look up a session without an ownership check.
    pub fn session(&self, session_id: &SessionId) -> Result<Option<Session>> {
        let conn = self.pool.get()?;
        Ok(SessionRepo::get_by_id(&conn, session_id.as_str())?.map(SessionRow::into_session))
    }

    /// Record the gateway's continuation token on a session.
    pub fn set_gateway_session(&self, session_id: &SessionId, token: &str) -> Result<()> {
        let conn = self.pool.get()?;
        let _ = SessionRepo::set_gateway_session(&conn, session_id.as_str(), token)?;
        Ok(())
    }

    /// Append the user's input as a turn.
    pub fn append_user_turn(&self, session_id: &SessionId, text: &str) -> Result<Turn> {
        let conn = self.pool.get()?;
        let row = TurnRepo::append(&conn, session_id.as_str(), &AppendTurnOptions::user(text))?;
        let _ = SessionRepo::touch(&conn, session_id.as_str())?;
        row.into_turn()
    }

    /// Append the synthesized reply as an assistant turn with its run metadata.
    pub fn append_assistant_turn(
        &self,
        session_id: &SessionId,
        text: &str,
        success: bool,
        results: &[CommandResult],
        elapsed_ms: u64,
    ) -> Result<Turn> {
        let results_json = serde_json::to_string(results)?;
        let conn = self.pool.get()?;
        let row = TurnRepo::append(
            &conn,
            session_id.as_str(),
            &AppendTurnOptions {
                author: "assistant",
                body: text,
                success: Some(success),
                command_count: Some(i64::try_from(results.len()).unwrap_or(i64::MAX)),
                results: Some(&results_json),
                elapsed_ms: Some(i64::try_from(elapsed_ms).unwrap_or(i64::MAX)),
            },
        )?;
        let _ = SessionRepo::touch(&conn, session_id.as_str())?;
        row.into_turn()
    }

    /// All turns of a session in order.
    pub fn turns(&self, session_id: &SessionId) -> Result<Vec<Turn>> {
        let conn = self.pool.get()?;
        TurnRepo::list_for_session(&conn, session_id.as_str())?
            .into_iter()
            .map(TurnRow::into_turn)
            .collect()
    }

    /// A user's sessions, most recently active first.
    pub fn list_sessions(&self, user: &UserId) -> Result<Vec<Session>> {
        let conn = self.pool.get()?;
        Ok(SessionRepo::list_for_user(&conn, user.as_str())?
            .into_iter()
            .map(SessionRow::into_session)
            .collect())
    }

    /// Delete a session and its turns. Returns `true` if it existed.
    pub fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
        let conn = self.pool.get()?;
        SessionRepo::delete(&conn, session_id.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
