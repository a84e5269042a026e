//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-anchored state machine. It holds no
//! threads and reads no clock: every command receives the current time in
//! epoch milliseconds together with the settings in force, and the caller
//! is responsible for calling `tick()` periodically.
//!
//! Remaining and elapsed seconds are always recomputed from an absolute
//! anchor (a countdown deadline or a flow start instant), never by
//! subtracting tick deltas, so a timer that was suspended for an hour
//! catches up with a single `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(mode) --toggle--> Countdown{end}   --toggle--> Idle (paused)
//!                                         --tick at 0--> Idle(next) | Countdown(next)
//! Idle(work) --toggle--> Flow{start}      --toggle--> Idle(break) | Idle(work)
//! any        --reset / mode change-->     Idle(mode) | armed(mode)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(&settings);
//! engine.toggle(&settings, clock.now_ms());
//! // Once per second, and again whenever the UI becomes visible:
//! let events = engine.tick(&settings, clock.now_ms());
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::mode::TimerMode;
use super::settings::TimerSettings;
use crate::clock::ms_to_utc;
use crate::events::Event;
use crate::session::SessionOutcome;

/// Run state of the timer. The anchors live inside the variants, so a
/// countdown deadline and a flow start can never coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    /// Counting down to `end_ms`.
    Countdown { end_ms: u64 },
    /// Counting up from `start_ms` (work mode with flow enabled only).
    Flow { start_ms: u64 },
}

/// Core timer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: TimerMode,
    state: TimerState,
    /// Completed work sessions since the engine was created.
    session_count: u32,
    time_left_secs: u64,
    elapsed_secs: u64,
    /// Length of the current phase when it was set up.
    phase_total_secs: u64,
    /// When the current run first started, across pauses.
    #[serde(default)]
    run_started_ms: Option<u64>,
    /// Set when a countdown expiry has been handled; cleared on every re-arm.
    #[serde(default)]
    completion_latched: bool,
}

impl TimerEngine {
    /// Create an idle engine in work mode with the full work duration.
    pub fn new(settings: &TimerSettings) -> Self {
        let total = settings.duration_secs(TimerMode::Work);
        Self {
            mode: TimerMode::Work,
            state: TimerState::Idle,
            session_count: 0,
            time_left_secs: total,
            elapsed_secs: 0,
            phase_total_secs: total,
            run_started_ms: None,
            completion_latched: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, TimerState::Idle)
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Whether the engine is paused part-way through a countdown.
    pub fn is_paused(&self) -> bool {
        matches!(self.state, TimerState::Idle) && self.time_left_secs < self.phase_total_secs
    }

    /// Build a full state snapshot event for `now_ms`.
    ///
    /// Derived values are computed from the anchors without mutating the
    /// engine, so a snapshot taken before a missed tick is still exact.
    pub fn snapshot(&self, settings: &TimerSettings, now_ms: u64) -> Event {
        let (time_left_secs, elapsed_secs) = match self.state {
            TimerState::Idle => (self.time_left_secs, self.elapsed_secs),
            TimerState::Countdown { end_ms } => (remaining_secs(end_ms, now_ms), 0),
            TimerState::Flow { start_ms } => (self.time_left_secs, elapsed_since(start_ms, now_ms)),
        };
        let flow = match self.state {
            TimerState::Flow { .. } => true,
            TimerState::Countdown { .. } => false,
            TimerState::Idle => settings.is_flow(self.mode),
        };
        let target_secs = settings.duration_secs(TimerMode::Work);
        Event::StateSnapshot {
            mode: self.mode,
            state: self.state,
            running: self.is_running(),
            flow,
            display_secs: if flow { elapsed_secs } else { time_left_secs },
            time_left_secs,
            elapsed_secs,
            target_secs,
            over_target: flow && elapsed_secs >= target_secs,
            session_count: self.session_count,
            at: ms_to_utc(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start when idle; pause a countdown or stop a flow run when running.
    pub fn toggle(&mut self, settings: &TimerSettings, now_ms: u64) -> Vec<Event> {
        match self.state {
            TimerState::Idle => {
                self.completion_latched = false;
                self.arm(settings, now_ms);
                debug!(mode = %self.mode, state = ?self.state, "timer started");
                vec![Event::TimerStarted {
                    mode: self.mode,
                    flow: matches!(self.state, TimerState::Flow { .. }),
                    remaining_secs: match self.state {
                        TimerState::Flow { .. } => 0,
                        _ => self.time_left_secs,
                    },
                    at: ms_to_utc(now_ms),
                }]
            }
            TimerState::Flow { .. } => self.stop_flow_session(settings, now_ms),
            TimerState::Countdown { end_ms } => {
                self.time_left_secs = remaining_secs(end_ms, now_ms);
                self.state = TimerState::Idle;
                debug!(mode = %self.mode, remaining = self.time_left_secs, "timer paused");
                vec![Event::TimerPaused {
                    mode: self.mode,
                    remaining_secs: self.time_left_secs,
                    at: ms_to_utc(now_ms),
                }]
            }
        }
    }

    /// Recompute derived time from the anchor. Call once per second while
    /// running and whenever a suspended UI becomes visible again.
    ///
    /// Returns the completion events when a countdown reaches zero.
    pub fn tick(&mut self, settings: &TimerSettings, now_ms: u64) -> Vec<Event> {
        match self.state {
            TimerState::Idle => Vec::new(),
            TimerState::Flow { start_ms } => {
                self.elapsed_secs = elapsed_since(start_ms, now_ms);
                Vec::new()
            }
            TimerState::Countdown { end_ms } => {
                self.time_left_secs = remaining_secs(end_ms, now_ms);
                if self.time_left_secs == 0 {
                    self.complete_countdown(settings, now_ms)
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Handle a countdown reaching zero. Only an expired countdown completes,
    /// and the completion latch keeps one expiry from producing two records.
    fn complete_countdown(&mut self, settings: &TimerSettings, now_ms: u64) -> Vec<Event> {
        let expired = matches!(self.state, TimerState::Countdown { end_ms } if end_ms <= now_ms);
        if !expired || self.completion_latched {
            return Vec::new();
        }
        self.completion_latched = true;

        let finished = self.mode;
        let elapsed = self.phase_total_secs.saturating_sub(self.time_left_secs);
        let started_ms = self
            .run_started_ms
            .unwrap_or_else(|| now_ms.saturating_sub(elapsed.saturating_mul(1000)));

        let mut events = vec![Event::SessionFinished {
            outcome: SessionOutcome {
                mode: finished,
                interrupted: false,
                elapsed_secs: elapsed,
                started_at: ms_to_utc(started_ms),
                finished_at: ms_to_utc(now_ms),
            },
        }];

        let next = if finished == TimerMode::Work {
            self.session_count = self.session_count.saturating_add(1);
            let next = TimerMode::break_after(self.session_count, settings.long_break_interval);
            events.push(Event::Alert {
                title: "Pomodoro Complete! 🍅".into(),
                body: if next == TimerMode::LongBreak {
                    "Time for a long break!".into()
                } else {
                    "Time for a short break!".into()
                },
            });
            next
        } else {
            events.push(Event::Alert {
                title: "Break Over!".into(),
                body: "Ready to focus again?".into(),
            });
            TimerMode::Work
        };

        self.enter_phase(settings, next);
        let auto_started = settings.auto_start_breaks;
        if auto_started {
            self.completion_latched = false;
            self.arm(settings, now_ms);
        }

        debug!(from = %finished, to = %next, auto_started, "countdown completed");
        events.push(Event::PhaseCompleted {
            from: finished,
            to: next,
            session_count: self.session_count,
            auto_started,
            at: ms_to_utc(now_ms),
        });
        events
    }

    /// End a flow run. Reaching the work target completes the session;
    /// stopping any earlier records it as interrupted with no partial credit.
    pub fn stop_flow_session(&mut self, settings: &TimerSettings, now_ms: u64) -> Vec<Event> {
        let TimerState::Flow { start_ms } = self.state else {
            return Vec::new();
        };
        let elapsed = elapsed_since(start_ms, now_ms);
        let target = settings.duration_secs(TimerMode::Work);
        let completed = elapsed >= target;

        let mut events = vec![Event::SessionFinished {
            outcome: SessionOutcome {
                mode: TimerMode::Work,
                interrupted: !completed,
                elapsed_secs: elapsed,
                started_at: ms_to_utc(start_ms),
                finished_at: ms_to_utc(now_ms),
            },
        }];

        if completed {
            self.session_count = self.session_count.saturating_add(1);
            let next = TimerMode::break_after(self.session_count, settings.long_break_interval);
            self.enter_phase(settings, next);
            events.push(Event::PhaseCompleted {
                from: TimerMode::Work,
                to: next,
                session_count: self.session_count,
                auto_started: false,
                at: ms_to_utc(now_ms),
            });
        } else {
            self.enter_phase(settings, TimerMode::Work);
        }
        debug!(elapsed, target, completed, "flow session stopped");
        events
    }

    /// Put the timer in `mode` with its full duration, optionally running.
    pub fn reset_timer(
        &mut self,
        settings: &TimerSettings,
        mode: TimerMode,
        auto_start: bool,
        now_ms: u64,
    ) -> Vec<Event> {
        self.enter_phase(settings, mode);
        self.completion_latched = false;
        if auto_start {
            self.arm(settings, now_ms);
        }
        debug!(mode = %mode, auto_start, "timer reset");
        vec![Event::TimerReset {
            mode,
            auto_start,
            at: ms_to_utc(now_ms),
        }]
    }

    /// Abandon the current run. A running work run is recorded as
    /// interrupted with whatever time it had accumulated.
    pub fn interrupt(&mut self, settings: &TimerSettings, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.mode == TimerMode::Work && self.is_running() {
            let elapsed = match self.state {
                TimerState::Flow { start_ms } => elapsed_since(start_ms, now_ms),
                TimerState::Countdown { end_ms } => self
                    .phase_total_secs
                    .saturating_sub(remaining_secs(end_ms, now_ms)),
                TimerState::Idle => 0,
            };
            let started_ms = match self.state {
                TimerState::Flow { start_ms } => start_ms,
                _ => self
                    .run_started_ms
                    .unwrap_or_else(|| now_ms.saturating_sub(elapsed.saturating_mul(1000))),
            };
            events.push(Event::SessionFinished {
                outcome: SessionOutcome {
                    mode: TimerMode::Work,
                    interrupted: true,
                    elapsed_secs: elapsed,
                    started_at: ms_to_utc(started_ms),
                    finished_at: ms_to_utc(now_ms),
                },
            });
        }
        events.extend(self.reset_timer(settings, self.mode, false, now_ms));
        events
    }

    /// Switch modes. Always stops and resets; a run in progress is dropped.
    pub fn mode_change(&mut self, settings: &TimerSettings, mode: TimerMode, now_ms: u64) -> Vec<Event> {
        self.reset_timer(settings, mode, false, now_ms)
    }

    /// Adopt new durations if the timer is idle and untouched.
    ///
    /// Running and paused timers keep their anchors and frozen time.
    /// Returns whether anything changed.
    pub fn sync_settings(&mut self, settings: &TimerSettings) -> bool {
        if self.is_running() || self.is_paused() {
            return false;
        }
        let total = settings.duration_secs(self.mode);
        if total == self.phase_total_secs && self.time_left_secs == total && self.elapsed_secs == 0 {
            return false;
        }
        self.enter_phase(settings, self.mode);
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Idle in `mode` with a full phase ahead.
    fn enter_phase(&mut self, settings: &TimerSettings, mode: TimerMode) {
        let total = settings.duration_secs(mode);
        self.mode = mode;
        self.state = TimerState::Idle;
        self.time_left_secs = total;
        self.phase_total_secs = total;
        self.elapsed_secs = 0;
        self.run_started_ms = None;
    }

    /// Start running from idle with the anchor the current mode calls for.
    fn arm(&mut self, settings: &TimerSettings, now_ms: u64) {
        if settings.is_flow(self.mode) {
            self.state = TimerState::Flow { start_ms: now_ms };
            self.elapsed_secs = 0;
            self.run_started_ms = Some(now_ms);
        } else {
            let end_ms = now_ms.saturating_add(self.time_left_secs.saturating_mul(1000));
            self.state = TimerState::Countdown { end_ms };
            self.run_started_ms.get_or_insert(now_ms);
        }
    }
}

/// Whole seconds until `end_ms`, rounded up and clamped at zero.
fn remaining_secs(end_ms: u64, now_ms: u64) -> u64 {
    end_ms.saturating_sub(now_ms).div_ceil(1000)
}

/// Whole seconds since `start_ms`, rounded down and clamped at zero.
fn elapsed_since(start_ms: u64, now_ms: u64) -> u64 {
    if now_ms < start_ms {
        warn!(start_ms, now_ms, "clock moved backwards; clamping elapsed time");
    }
    now_ms.saturating_sub(start_ms) / 1000
}
