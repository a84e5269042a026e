use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionOutcome;
use crate::timer::{TimerMode, TimerState};

/// Every state change of the timer produces one or more Events.
/// The controller turns some of them into side effects (recording,
/// notifications); the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        flow: bool,
        /// Seconds left for countdowns, zero for flow runs.
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase ended and the timer moved on to `to`.
    PhaseCompleted {
        from: TimerMode,
        to: TimerMode,
        session_count: u32,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    /// A run ended; the outcome is due for recording.
    SessionFinished { outcome: SessionOutcome },
    /// Something the user should be told about right now.
    Alert { title: String, body: String },
    TimerReset {
        mode: TimerMode,
        auto_start: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        state: TimerState,
        running: bool,
        flow: bool,
        /// Elapsed seconds in flow mode, remaining seconds otherwise.
        display_secs: u64,
        time_left_secs: u64,
        elapsed_secs: u64,
        target_secs: u64,
        over_target: bool,
        session_count: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        match self {
            Event::SessionFinished { outcome } => Some(outcome),
            _ => None,
        }
    }
}
