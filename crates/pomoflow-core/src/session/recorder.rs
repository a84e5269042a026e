use tracing::info;

use super::{Session, SessionOutcome};
use crate::error::Result;
use crate::storage::SessionStore;
use crate::timer::TimerMode;

/// Turns finished timer runs into stored [`Session`] records.
///
/// Only work runs are sessions; finished breaks are acknowledged and dropped.
/// Nothing is retried: a failed write is returned as-is.
pub struct SessionRecorder<S> {
    store: S,
}

impl<S: SessionStore> SessionRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one run.
    ///
    /// A non-interrupted run attributed to a task also adds exactly one to
    /// that task's actual pomodoro count, whatever its length.
    ///
    /// # Errors
    /// Returns the store's error if appending or the task update fails. The
    /// session may already be appended when the task update fails.
    pub fn record(
        &self,
        outcome: &SessionOutcome,
        task_id: Option<&str>,
    ) -> Result<Option<Session>> {
        if outcome.mode != TimerMode::Work {
            return Ok(None);
        }

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.map(String::from),
            duration_minutes: outcome.duration_minutes(),
            started_at: outcome.started_at,
            completed_at: outcome.finished_at,
            interrupted: outcome.interrupted,
        };
        self.store.append(&session)?;

        if let (Some(task_id), false) = (task_id, outcome.interrupted) {
            self.store.increment_task_actual(task_id)?;
        }

        info!(
            session_id = %session.id,
            minutes = session.duration_minutes,
            interrupted = session.interrupted,
            task_id = ?session.task_id,
            "session recorded"
        );
        Ok(Some(session))
    }
}
