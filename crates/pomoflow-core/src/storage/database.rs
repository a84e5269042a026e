//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Recorded pomodoro sessions (completed and interrupted)
//! - Tasks and projects sessions are attributed to
//! - Key-value store for application state (the serialized timer)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, migrations, SessionStore};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::session::Session;
use crate::task::{Project, Task};

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/pomoflow/pomoflow.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomoflow.db"))
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn create_task(&self, task: &Task) -> Result<()> {
        if task.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        if let Some(project_id) = &task.project_id {
            self.get_project(project_id)?.ok_or_else(|| ValidationError::NotFound {
                kind: "project",
                id: project_id.clone(),
            })?;
        }
        self.conn.execute(
            "INSERT INTO tasks (id, title, project_id, completed, estimated_pomodoros, actual_pomodoros, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id,
                task.title,
                task.project_id,
                task.completed,
                task.estimated_pomodoros,
                task.actual_pomodoros,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let task = self
            .conn
            .query_row(
                "SELECT id, title, project_id, completed, estimated_pomodoros, actual_pomodoros, created_at
                 FROM tasks WHERE id = ?1",
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    /// Mark a task as done (or not done).
    pub fn set_task_completed(&self, id: &str, completed: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?2 WHERE id = ?1",
            params![id, completed],
        )?;
        if changed == 0 {
            return Err(ValidationError::NotFound {
                kind: "task",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // ── Projects ─────────────────────────────────────────────────────

    pub fn create_project(&self, project: &Project) -> Result<()> {
        if project.name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        self.conn.execute(
            "INSERT INTO projects (id, name, color, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id,
                project.name,
                project.color,
                project.completed,
                project.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, color, completed, created_at FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    // ── KV ───────────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SessionStore for Database {
    fn append(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, task_id, duration_minutes, started_at, completed_at, interrupted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.task_id,
                session.duration_minutes,
                session.started_at.to_rfc3339(),
                session.completed_at.to_rfc3339(),
                session.interrupted,
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, duration_minutes, started_at, completed_at, interrupted
             FROM sessions
             ORDER BY completed_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], row_to_session)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    fn increment_task_actual(&self, task_id: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET actual_pomodoros = actual_pomodoros + 1 WHERE id = ?1",
            params![task_id],
        )?;
        if changed == 0 {
            return Err(ValidationError::NotFound {
                kind: "task",
                id: task_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, project_id, completed, estimated_pomodoros, actual_pomodoros, created_at
             FROM tasks
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], row_to_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    fn projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, completed, created_at
             FROM projects
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map([], row_to_project)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        task_id: row.get(1)?,
        duration_minutes: row.get(2)?,
        started_at: parse_timestamp(3, row.get(3)?)?,
        completed_at: parse_timestamp(4, row.get(4)?)?,
        interrupted: row.get(5)?,
    })
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        project_id: row.get(2)?,
        completed: row.get(3)?,
        estimated_pomodoros: row.get(4)?,
        actual_pomodoros: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
    })
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        completed: row.get(3)?,
        created_at: parse_timestamp(4, row.get(4)?)?,
    })
}
