//! SQLite-based storage for tasks and commitments.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use super::traits::{BusyIntervalSource, CommitmentStore, TaskSource};
use crate::commitment::{Commitment, CommitmentTag, NewCommitment};
use crate::error::{CoreError, DataAccessError};
use crate::task::{Task, TaskStatus};
use crate::timeline::{BusyInterval, TimeInterval, WorkDayWindow};

// === Helper Functions ===

/// Format an instant for storage.
///
/// Fixed-width UTC text so that string comparison in SQL orders correctly.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(table: &str, value: &str) -> Result<DateTime<Utc>, DataAccessError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DataAccessError::Corrupt {
            table: table.to_string(),
            message: format!("bad timestamp '{value}': {e}"),
        })
}

fn corrupt(table: &str, message: String) -> DataAccessError {
    DataAccessError::Corrupt {
        table: table.to_string(),
        message,
    }
}

/// Raw `tasks` row before decoding.
struct TaskRow {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    estimated_minutes: Option<i64>,
    priority: i32,
    due_at: String,
    status: String,
    created_at: String,
}

const TASK_COLUMNS: &str =
    "id, user_id, title, description, estimated_minutes, priority, due_at, status, created_at";

fn read_task_row(row: &rusqlite::Row) -> Result<TaskRow, rusqlite::Error> {
    Ok(TaskRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        estimated_minutes: row.get(4)?,
        priority: row.get(5)?,
        due_at: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl TryFrom<TaskRow> for Task {
    type Error = DataAccessError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            status: row.status.parse().map_err(|e| corrupt("tasks", e))?,
            due_at: parse_datetime("tasks", &row.due_at)?,
            created_at: parse_datetime("tasks", &row.created_at)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            estimated_minutes: row.estimated_minutes,
            priority: row.priority,
        })
    }
}

/// Raw `commitments` row before decoding.
struct CommitmentRow {
    id: String,
    user_id: String,
    title: String,
    tag: String,
    linked_task_id: Option<String>,
    start_at: String,
    end_at: String,
    created_at: String,
}

const COMMITMENT_COLUMNS: &str =
    "id, user_id, title, tag, linked_task_id, start_at, end_at, created_at";

fn read_commitment_row(row: &rusqlite::Row) -> Result<CommitmentRow, rusqlite::Error> {
    Ok(CommitmentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        tag: row.get(3)?,
        linked_task_id: row.get(4)?,
        start_at: row.get(5)?,
        end_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl TryFrom<CommitmentRow> for Commitment {
    type Error = DataAccessError;

    fn try_from(row: CommitmentRow) -> Result<Self, Self::Error> {
        let start = parse_datetime("commitments", &row.start_at)?;
        let end = parse_datetime("commitments", &row.end_at)?;
        Ok(Commitment {
            interval: TimeInterval::new(start, end)
                .map_err(|e| corrupt("commitments", e.to_string()))?,
            tag: row.tag.parse().map_err(|e| corrupt("commitments", e))?,
            created_at: parse_datetime("commitments", &row.created_at)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            linked_task_id: row.linked_task_id,
        })
    }
}

/// SQLite database for the planner.
///
/// Stores tasks and commitments. Every commitment counts as busy time for
/// its user regardless of tag.
pub struct PlannerDb {
    conn: Mutex<Connection>,
}

impl PlannerDb {
    /// Open the planner database at `~/.config/autoplan/autoplan.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("autoplan.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DataAccessError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, CoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CoreError> {
        Self::migrate(&conn)
            .map_err(|e| DataAccessError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id                TEXT PRIMARY KEY,
                user_id           TEXT NOT NULL,
                title             TEXT NOT NULL,
                description       TEXT,
                estimated_minutes INTEGER,
                priority          INTEGER NOT NULL DEFAULT 0,
                due_at            TEXT NOT NULL,
                status            TEXT NOT NULL DEFAULT 'pending',
                created_at        TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS commitments (
                id             TEXT PRIMARY KEY,
                user_id        TEXT NOT NULL,
                title          TEXT NOT NULL,
                tag            TEXT NOT NULL,
                linked_task_id TEXT,
                start_at       TEXT NOT NULL,
                end_at         TEXT NOT NULL,
                created_at     TEXT NOT NULL
            );",
        )?;

        migrations::migrate(conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DataAccessError> {
        self.conn.lock().map_err(|_| DataAccessError::Locked)
    }

    // === Task CRUD ===

    /// Create a new task.
    pub fn create_task(&self, task: &Task) -> Result<(), DataAccessError> {
        self.conn()?.execute(
            "INSERT INTO tasks (id, user_id, title, description, estimated_minutes, priority, due_at, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                task.id,
                task.user_id,
                task.title,
                task.description,
                task.estimated_minutes,
                task.priority,
                format_datetime(&task.due_at),
                task.status.as_str(),
                format_datetime(&task.created_at),
            ],
        )?;
        Ok(())
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DataAccessError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                read_task_row,
            )
            .optional()?;
        row.map(Task::try_from).transpose()
    }

    /// List every task of a user, soonest due first.
    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, DataAccessError> {
        self.query_tasks(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY due_at"),
            user_id,
        )
    }

    /// Change the status of a task.
    pub fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<bool, DataAccessError> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a task.
    /// Delete a task. Returns whether a row was removed.
    pub fn delete_task(&self, id: &str) -> Result<bool, DataAccessError> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn query_tasks(&self, sql: &str, user_id: &str) -> Result<Vec<Task>, DataAccessError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![user_id], read_task_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(Task::try_from).collect()
    }

    // === Commitment CRUD ===

    /// List commitments of a user overlapping `[from, to)`, in start order.
    ///
    /// Without bounds, every commitment of the user is returned.
    pub fn list_user_commitments(
        &self,
        user_id: &str,
        range: Option<&TimeInterval>,
    ) -> Result<Vec<Commitment>, DataAccessError> {
        let conn = self.conn()?;
        let rows = match range {
            Some(range) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COMMITMENT_COLUMNS} FROM commitments
                     WHERE user_id = ?1 AND start_at < ?3 AND end_at > ?2
                     ORDER BY start_at"
                ))?;
                let rows = stmt
                    .query_map(
                        params![
                            user_id,
                            format_datetime(&range.start()),
                            format_datetime(&range.end())
                        ],
                        read_commitment_row,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COMMITMENT_COLUMNS} FROM commitments
                     WHERE user_id = ?1 ORDER BY start_at"
                ))?;
                let rows = stmt
                    .query_map(params![user_id], read_commitment_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        rows.into_iter().map(Commitment::try_from).collect()
    }

    /// Delete a commitment.
    pub fn delete_commitment(&self, id: &str) -> Result<bool, DataAccessError> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM commitments WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl BusyIntervalSource for PlannerDb {
    fn busy_intervals(
        &self,
        user_id: &str,
        window: &WorkDayWindow,
    ) -> Result<Vec<BusyInterval>, DataAccessError> {
        Ok(self
            .list_user_commitments(user_id, Some(&window.interval))?
            .into_iter()
            .map(|c| c.interval)
            .collect())
    }
}

impl TaskSource for PlannerDb {
    fn pending_tasks(&self, user_id: &str) -> Result<Vec<Task>, DataAccessError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND status = ?2"
        ))?;
        let rows = stmt
            .query_map(
                params![user_id, TaskStatus::Pending.as_str()],
                read_task_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(Task::try_from).collect()
    }
}

impl CommitmentStore for PlannerDb {
    fn create_commitment(
        &self,
        user_id: &str,
        commitment: NewCommitment,
    ) -> Result<Commitment, DataAccessError> {
        let created = Commitment::from_new(user_id, commitment);
        self.conn()?.execute(
            "INSERT INTO commitments (id, user_id, title, tag, linked_task_id, start_at, end_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                created.id,
                created.user_id,
                created.title,
                created.tag.as_str(),
                created.linked_task_id,
                format_datetime(&created.start()),
                format_datetime(&created.end()),
                format_datetime(&created.created_at),
            ],
        )?;
        Ok(created)
    }

    fn list_commitments(
        &self,
        user_id: &str,
        tag: CommitmentTag,
    ) -> Result<Vec<Commitment>, DataAccessError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMMITMENT_COLUMNS} FROM commitments
             WHERE user_id = ?1 AND tag = ?2 ORDER BY start_at"
        ))?;
        let rows = stmt
            .query_map(params![user_id, tag.as_str()], read_commitment_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(Commitment::try_from).collect()
    }
}
