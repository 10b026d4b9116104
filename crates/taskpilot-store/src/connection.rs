//! Connection pooling and schema migrations.

use std::path::Path;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::debug;

use crate::errors::Result;

/// Pooled SQLite handle used throughout the store.
pub type Pool = r2d2::Pool<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id               TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL,
    gateway_session_id TEXT,
    created_at       TEXT NOT NULL,
    last_activity_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_activity
    ON sessions (user_id, last_activity_at DESC);

CREATE TABLE IF NOT EXISTS turns (
    id            TEXT PRIMARY KEY,
    session_id    TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    author        TEXT NOT NULL,
    body          TEXT NOT NULL,
    sequence      INTEGER NOT NULL,
    created_at    TEXT NOT NULL,
    success       INTEGER,
    command_count INTEGER,
    results       TEXT,
    elapsed_ms    INTEGER,
    UNIQUE (session_id, sequence)
);

CREATE INDEX IF NOT EXISTS idx_turns_session
    ON turns (session_id, sequence);
";

/// Apply the schema to a connection. Idempotent.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    debug!("conversation store migrations applied");
    Ok(())
}

fn configure(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
}

/// Open a file-backed pool and migrate the schema.
pub fn new_pool(path: &Path, max_size: u32) -> Result<Pool> {
    let manager = SqliteConnectionManager::file(path).with_init(configure);
    let pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;
    let conn = pool.get()?;
    run_migrations(&conn)?;
    drop(conn);
    Ok(pool)
}

/// Open an in-memory pool for tests.
///
/// Size is pinned to one connection: each SQLite `:memory:` connection is its
/// own database, so a larger pool would hand out empty databases.
pub fn new_in_memory_pool() -> Result<Pool> {
    let manager = SqliteConnectionManager::memory().with_init(configure);
    let pool = r2d2::Pool::builder().max_size(1).build(manager)?;
    let conn = pool.get()?;
    run_migrations(&conn)?;
    drop(conn);
    Ok(pool)
}
