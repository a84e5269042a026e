//! # Pomoflow Core Library
//!
//! Core logic for the Pomoflow Pomodoro timer. Every operation is available
//! through the `pomoflow-cli` binary; other front ends are thin layers over
//! this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: an anchor-based state machine (absolute deadline or
//!   start instant) that the caller drives with `tick()`; suspended callers
//!   catch up with a single recomputation
//! - **Controller / Ticker**: reads the [`Clock`], feeds the engine and routes
//!   its events to the session recorder and the notifier
//! - **Storage**: SQLite session storage and TOML configuration
//! - **Stats**: pure aggregation over a session snapshot
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`TimerController`]: side-effect routing around the engine
//! - [`SessionRecorder`]: turns finished runs into stored sessions
//! - [`Database`]: session, task and project persistence
//! - [`Config`]: application configuration management
//! - [`stats::compute`]: statistics snapshot

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, DispatchError, ValidationError};
pub use events::Event;
pub use notify::{LogNotifier, NoopNotifier, Notification, Notifier};
pub use session::{Session, SessionOutcome, SessionRecorder};
pub use stats::{StatsOptions, StatsSnapshot};
pub use storage::{Config, Database, MemoryStore, SessionStore};
pub use task::{Project, Task};
pub use timer::{
    duration_secs, Ticker, TimerController, TimerEngine, TimerMode, TimerSettings, TimerState,
};
