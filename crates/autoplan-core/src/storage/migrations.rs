//! Database schema migrations for autoplan.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: baseline `tasks` and `commitments` tables.
///
/// The tables are created by `PlannerDb::migrate()` directly; this only
/// records the version.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    set_schema_version(conn, 1)
}

/// Migration v2: indexes for the per-day busy lookup and the dedupe lookups.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_commitments_user_start
             ON commitments(user_id, start_at);
         CREATE INDEX IF NOT EXISTS idx_commitments_user_tag
             ON commitments(user_id, tag);
         CREATE INDEX IF NOT EXISTS idx_tasks_user_status
             ON tasks(user_id, status);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    Ok(())
}

/// Migration v3: widen stored instants from microsecond to nanosecond
/// precision, keeping every timestamp column the same width.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    for (table, column) in [
        ("tasks", "due_at"),
        ("tasks", "created_at"),
        ("commitments", "start_at"),
        ("commitments", "end_at"),
        ("commitments", "created_at"),
    ] {
        tx.execute(
            &format!(
                "UPDATE {table} SET {column} = substr({column}, 1, 26) || '000Z'
                 WHERE length({column}) = 27 AND {column} LIKE '%Z'"
            ),
            [],
        )?;
    }

    set_schema_version(&tx, 3)?;
    tx.commit()?;
    Ok(())
}
