//! Session repository — CRUD for the `sessions` table.

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::errors::Result;
use crate::row_types::SessionRow;

fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<SessionRow, rusqlite::Error> {
    Ok(SessionRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        gateway_session_id: row.get(2)?,
        created_at: row.get(3)?,
        last_activity_at: row.get(4)?,
    })
}

const COLUMNS: &str = "id, user_id, gateway_session_id, created_at, last_activity_at";

/// Session repository — stateless, every method takes `&Connection`.
pub struct SessionRepo;

impl SessionRepo {
    /// Create a fresh session for a user.
    pub fn create(conn: &Connection, user_id: &str) -> Result<SessionRow> {
        let id = format!("sess_{}", Uuid::now_v7());
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO sessions (id, user_id, gateway_session_id, created_at, last_activity_at)
             VALUES (?1, ?2, NULL, ?3, ?3)",
            params![id, user_id, now],
        )?;
        Ok(SessionRow {
            id,
            user_id: user_id.to_string(),
            gateway_session_id: None,
            created_at: now.clone(),
            last_activity_at: now,
        })
    }

    /// Get a session by ID.
    pub fn get_by_id(conn: &Connection, session_id: &str) -> Result<Option<SessionRow>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM sessions WHERE id = ?1"),
                params![session_id],
                map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List a user's sessions, most recently active first.
    pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<SessionRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM sessions WHERE user_id = ?1
             ORDER BY last_activity_at DESC"
        ))?;
        let rows = stmt
            .query_map(params![user_id], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Record the gateway's continuation token on a session.
    pub fn set_gateway_session(
        conn: &Connection,
        session_id: &str,
        gateway_session_id: &str,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE sessions SET gateway_session_id = ?1 WHERE id = ?2",
            params![gateway_session_id, session_id],
        )?;
        Ok(changed > 0)
    }

    /// Advance the last-activity timestamp to now.
    pub fn touch(conn: &Connection, session_id: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE sessions SET last_activity_at = ?1 WHERE id = ?2",
            params![now, session_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a session; its turns cascade. Returns `true` if a row went.
    pub fn delete(conn: &Connection, session_id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
        Ok(changed > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
