use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (creating if needed) the audit database and make sure its tables
/// exist.
pub fn open_audit_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open audit database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Lazy migrations. Safe to run on every start and on in-memory databases used
/// by tests.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        )",
        [],
    )
    .context("failed to create actions table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS deliveries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            collection TEXT NOT NULL,
            number TEXT NOT NULL,
            delivered_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        )",
        [],
    )
    .context("failed to create deliveries table")?;

    Ok(())
}
