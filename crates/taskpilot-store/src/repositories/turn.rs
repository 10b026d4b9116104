//! Turn repository — append and list for the `turns` table.
//!
//! Sequence numbers are assigned inside the insert from the current maximum,
//! so the `(session_id, sequence)` uniqueness constraint holds without the
//! caller tracking counters.

use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::errors::Result;
use crate::row_types::TurnRow;

/// Options for appending a turn.
pub struct AppendTurnOptions<'a> {
    /// `"user"` or `"assistant"`.
    pub author: &'a str,
    /// Message text.
    pub body: &'a str,
    /// Assistant turns: run outcome.
    pub success: Option<bool>,
    /// Assistant turns: commands executed.
    pub command_count: Option<i64>,
    /// Assistant turns: JSON-encoded results payload.
    pub results: Option<&'a str>,
    /// Assistant turns: latency in milliseconds.
    pub elapsed_ms: Option<i64>,
}

impl<'a> AppendTurnOptions<'a> {
    /// A plain user turn.
    #[must_use]
    pub fn user(body: &'a str) -> Self {
        Self {
            author: "user",
            body,
            success: None,
            command_count: None,
            results: None,
            elapsed_ms: None,
        }
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> std::result::Result<TurnRow, rusqlite::Error> {
    Ok(TurnRow {
        id: row.get(0)?,
        session_id: row.get(1)?,
        author: row.get(2)?,
        body: row.get(3)?,
        sequence: row.get(4)?,
        created_at: row.get(5)?,
        success: row.get(6)?,
        command_count: row.get(7)?,
        results: row.get(8)?,
        elapsed_ms: row.get(9)?,
    })
}

const COLUMNS: &str =
    "id, session_id, author, body, sequence, created_at, success, command_count, results, elapsed_ms";

/// Turn repository — stateless, every method takes `&Connection`.
pub struct TurnRepo;

impl TurnRepo {
    /// Append a turn at the next free sequence position.
    pub fn append(
        conn: &Connection,
        session_id: &str,
        opts: &AppendTurnOptions<'_>,
    ) -> Result<TurnRow> {
        let id = format!("turn_{}", Uuid::now_v7());
        let now = chrono::Utc::now().to_rfc3339();
        let _ = conn.execute(
            "INSERT INTO turns
                 (id, session_id, author, body, sequence, created_at,
                  success, command_count, results, elapsed_ms)
             VALUES (?1, ?2, ?3, ?4,
                 (SELECT COALESCE(MAX(sequence) + 1, 0) FROM turns WHERE session_id = ?2),
                 ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                session_id,
                opts.author,
                opts.body,
                now,
                opts.success,
                opts.command_count,
                opts.results,
                opts.elapsed_ms,
            ],
        )?;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM turns WHERE id = ?1"),
            params![id],
            map_row,
        )
        .map_err(Into::into)
    }

    /// All turns of a session in sequence order.
    pub fn list_for_session(conn: &Connection, session_id: &str) -> Result<Vec<TurnRow>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM turns WHERE session_id = ?1 ORDER BY sequence ASC"
        ))?;
        let rows = stmt
            .query_map(params![session_id], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
