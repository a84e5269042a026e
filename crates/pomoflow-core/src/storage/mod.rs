mod config;
pub mod database;
mod memory;
pub mod migrations;

pub use config::{Config, StatsConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::Result;
use crate::session::Session;
use crate::task::{Project, Task};

/// Durable collection of sessions, tasks and projects.
///
/// The timer only appends sessions and bumps task counters; statistics read
/// whole snapshots. Write failures are returned to the caller and never
/// retried here.
pub trait SessionStore {
    fn append(&self, session: &Session) -> Result<()>;

    fn list(&self) -> Result<Vec<Session>>;

    /// Add one to the task's actual pomodoro count.
    fn increment_task_actual(&self, task_id: &str) -> Result<()>;

    fn tasks(&self) -> Result<Vec<Task>>;

    fn projects(&self) -> Result<Vec<Project>>;
}

/// Returns `~/.config/pomoflow[-dev]/` based on POMOFLOW_ENV.
///
/// Set POMOFLOW_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomoflow-dev")
    } else {
        base_dir.join("pomoflow")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
