//! Periodic driver for a running timer.
//!
//! Ticks are only a display refresh: the engine recomputes from its anchors
//! on every call, so a late or skipped tick never loses time. The ticker is
//! restarted whenever the running state flips and aborted when the timer
//! stops, so at most one periodic task exists per controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::controller::{DispatchResult, TimerController};
use crate::events::Event;
use crate::notify::Notifier;
use crate::storage::SessionStore;

pub type SharedController<S, N> = Arc<Mutex<TimerController<S, N>>>;

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

pub struct Ticker<S, N> {
    controller: SharedController<S, N>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl<S, N> Ticker<S, N>
where
    S: SessionStore + Send + 'static,
    N: Notifier + 'static,
{
    pub fn new(controller: SharedController<S, N>) -> Self {
        Self::with_period(controller, DEFAULT_PERIOD)
    }

    pub fn with_period(controller: SharedController<S, N>, period: Duration) -> Self {
        Self {
            controller,
            period,
            handle: None,
            ticks: Arc::new(AtomicU64::new(0)),
            events: None,
        }
    }

    /// Forward every tick's events (including snapshots) to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Number of ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Toggle the timer and start or stop ticking to match.
    pub async fn toggle(&mut self) -> DispatchResult {
        let result = self.controller.lock().await.toggle();
        self.sync().await;
        result
    }

    /// Restart the periodic task if the timer runs, stop it otherwise.
    pub async fn sync(&mut self) {
        let running = self.controller.lock().await.is_running();
        if running {
            self.restart();
        } else {
            self.stop();
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("ticker stopped");
        }
    }

    fn restart(&mut self) {
        self.stop();

        let controller = self.controller.clone();
        let ticks = self.ticks.clone();
        let events = self.events.clone();
        let period = self.period;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;

                let (result, snapshot) = {
                    let mut guard = controller.lock().await;
                    if !guard.is_running() {
                        break;
                    }
                    let result = guard.tick();
                    (result, guard.snapshot())
                };
                ticks.fetch_add(1, Ordering::Relaxed);

                let mut batch = match result {
                    Ok(batch) => batch,
                    Err(e) => {
                        warn!(error = %e.source, "tick side effect failed");
                        e.events
                    }
                };
                batch.push(snapshot);
                if let Some(tx) = &events {
                    for event in batch {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                }
            }
            debug!("ticker exited: timer no longer running");
        }));
        debug!(period_ms = period.as_millis() as u64, "ticker started");
    }
}

impl<S, N> Drop for Ticker<S, N> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
