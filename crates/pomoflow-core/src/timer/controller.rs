//! Glue between the pure [`TimerEngine`] and its collaborators.
//!
//! The controller reads the clock, feeds the engine, and turns the events
//! it returns into side effects: finished runs go to the session recorder,
//! alerts go to the notifier. Engine transitions are applied before any
//! side effect runs, so a failed store write never rolls the timer back.

use std::sync::Arc;

use tracing::warn;

use super::engine::TimerEngine;
use super::mode::TimerMode;
use super::settings::TimerSettings;
use crate::clock::Clock;
use crate::error::{CoreError, DispatchError};
use crate::events::Event;
use crate::notify::{Notification, Notifier};
use crate::session::{Session, SessionRecorder};
use crate::storage::SessionStore;

/// Events from one controller call, or the first store failure together
/// with those events.
pub type DispatchResult = std::result::Result<Vec<Event>, DispatchError>;

pub struct TimerController<S, N> {
    engine: TimerEngine,
    settings: TimerSettings,
    clock: Arc<dyn Clock>,
    recorder: SessionRecorder<S>,
    notifier: N,
    task_id: Option<String>,
    recorded: Vec<Session>,
}

impl<S: SessionStore, N: Notifier> TimerController<S, N> {
    pub fn new(settings: TimerSettings, clock: Arc<dyn Clock>, store: S, notifier: N) -> Self {
        Self {
            engine: TimerEngine::new(&settings),
            settings,
            clock,
            recorder: SessionRecorder::new(store),
            notifier,
            task_id: None,
            recorded: Vec::new(),
        }
    }

    /// Resume from a previously saved engine.
    pub fn with_engine(mut self, engine: TimerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        self.recorder.store()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Attribute subsequent sessions to `task_id`.
    pub fn set_task(&mut self, task_id: Option<String>) {
        self.task_id = task_id;
    }

    /// Sessions written by this controller, oldest first.
    pub fn recorded(&self) -> &[Session] {
        &self.recorded
    }

    pub fn set_settings(&mut self, settings: TimerSettings) {
        self.engine.sync_settings(&settings);
        self.settings = settings;
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(&self.settings, self.clock.now_ms())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn toggle(&mut self) -> DispatchResult {
        let events = self.engine.toggle(&self.settings, self.clock.now_ms());
        self.dispatch(events)
    }

    pub fn tick(&mut self) -> DispatchResult {
        let events = self.engine.tick(&self.settings, self.clock.now_ms());
        self.dispatch(events)
    }

    /// Catch up after the UI was hidden. Same as a tick: the anchors make a
    /// single recomputation exact.
    pub fn refresh(&mut self) -> DispatchResult {
        self.tick()
    }

    pub fn stop_flow_session(&mut self) -> DispatchResult {
        let events = self.engine.stop_flow_session(&self.settings, self.clock.now_ms());
        self.dispatch(events)
    }

    pub fn reset(&mut self, mode: TimerMode, auto_start: bool) -> DispatchResult {
        let events = self
            .engine
            .reset_timer(&self.settings, mode, auto_start, self.clock.now_ms());
        self.dispatch(events)
    }

    pub fn interrupt(&mut self) -> DispatchResult {
        let events = self.engine.interrupt(&self.settings, self.clock.now_ms());
        self.dispatch(events)
    }

    pub fn mode_change(&mut self, mode: TimerMode) -> DispatchResult {
        let events = self.engine.mode_change(&self.settings, mode, self.clock.now_ms());
        self.dispatch(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Run side effects for `events`. Every event is handled even if an
    /// earlier write failed; the first failure is returned with the events.
    fn dispatch(&mut self, events: Vec<Event>) -> DispatchResult {
        let mut first_error: Option<CoreError> = None;
        for event in &events {
            match event {
                Event::SessionFinished { outcome } => {
                    match self.recorder.record(outcome, self.task_id.as_deref()) {
                        Ok(Some(session)) => self.recorded.push(session),
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, "failed to record session");
                            first_error.get_or_insert(e);
                        }
                    }
                }
                Event::Alert { title, body } => self.alert(title, body),
                Event::TimerPaused { .. } | Event::TimerReset { .. } => {
                    if let Err(e) = self.notifier.cancel() {
                        warn!(error = %e, "failed to cancel notification");
                    }
                }
                _ => {}
            }
        }
        match first_error {
            Some(source) => Err(DispatchError { source, events }),
            None => Ok(events),
        }
    }

    fn alert(&self, title: &str, body: &str) {
        if self.settings.sound_enabled {
            if let Err(e) = self.notifier.chime() {
                warn!(error = %e, "failed to play sound");
            }
        }
        if self.settings.notifications_enabled {
            if let Err(e) = self.notifier.notify(&Notification::new(title, body)) {
                warn!(error = %e, "failed to show notification");
            }
        }
    }
}
