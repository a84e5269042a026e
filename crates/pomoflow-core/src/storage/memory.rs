//! In-process session store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::SessionStore;
use crate::error::{DatabaseError, Result, ValidationError};
use crate::session::Session;
use crate::task::{Project, Task};

#[derive(Debug, Default)]
struct Inner {
    sessions: Vec<Session>,
    tasks: Vec<Task>,
    projects: Vec<Project>,
}

/// Session store kept in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(tasks: Vec<Task>, projects: Vec<Project>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: Vec::new(),
                tasks,
                projects,
            }),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail, to exercise error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| DatabaseError::Unavailable("memory store poisoned".into()).into())
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("writes disabled".into()).into());
        }
        Ok(())
    }
}

impl SessionStore for MemoryStore {
    fn append(&self, session: &Session) -> Result<()> {
        self.check_writable()?;
        self.lock()?.sessions.push(session.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Session>> {
        Ok(self.lock()?.sessions.clone())
    }

    fn increment_task_actual(&self, task_id: &str) -> Result<()> {
        self.check_writable()?;
        let mut inner = self.lock()?;
        let task = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "task",
                id: task_id.to_string(),
            })?;
        task.actual_pomodoros = task.actual_pomodoros.saturating_add(1);
        Ok(())
    }

    fn tasks(&self) -> Result<Vec<Task>> {
        Ok(self.lock()?.tasks.clone())
    }

    fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.lock()?.projects.clone())
    }
}
