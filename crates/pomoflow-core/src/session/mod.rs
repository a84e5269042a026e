//! Recorded pomodoro sessions.

mod recorder;

pub use recorder::SessionRecorder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// One finished or interrupted work run. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    /// Actual elapsed minutes, not the configured length.
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub interrupted: bool,
}

/// What the timer hands to the recorder when a run ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub mode: TimerMode,
    pub interrupted: bool,
    /// Seconds the run was actually counting.
    pub elapsed_secs: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SessionOutcome {
    /// Elapsed time rounded to the nearest whole minute.
    pub fn duration_minutes(&self) -> u32 {
        u32::try_from(self.elapsed_secs.saturating_add(30) / 60).unwrap_or(u32::MAX)
    }
}
