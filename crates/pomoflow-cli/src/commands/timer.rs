use std::sync::Arc;

use clap::Subcommand;
use pomoflow_core::storage::Database;
use pomoflow_core::timer::{
    DispatchResult, Ticker, TimerController, TimerEngine, TimerMode, TimerSettings, TimerState,
};
use pomoflow_core::{Config, CoreError, Event, SystemClock};
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::notifier::TerminalNotifier;

const ENGINE_KEY: &str = "timer_engine";
const TASK_KEY: &str = "timer_task";

type Controller = TimerController<Database, TerminalNotifier>;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start when idle, pause a countdown, stop a flow session
    Toggle,
    /// Start the timer if it is idle
    Start,
    /// Pause a running countdown
    Pause,
    /// Stop the current flow session
    Stop,
    /// Abandon the current run (recorded as interrupted)
    Interrupt,
    /// Reset to a full phase
    Reset {
        /// work, short-break or long-break (default: current mode)
        #[arg(long)]
        mode: Option<TimerMode>,
        /// Start running right away
        #[arg(long)]
        auto_start: bool,
    },
    /// Switch mode, discarding any run in progress
    Mode {
        /// work, short-break or long-break
        mode: TimerMode,
    },
    /// Attribute sessions to a task
    Attach {
        /// Task ID; omit to clear
        task_id: Option<String>,
    },
    /// Print current timer state as JSON
    Status,
    /// Tick once per second until the timer stops, printing events
    Watch,
}

fn load_engine(db: &Database, settings: &TimerSettings) -> TimerEngine {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        match serde_json::from_str::<TimerEngine>(&json) {
            Ok(engine) => return engine,
            Err(e) => warn!(error = %e, "discarding unreadable saved timer"),
        }
    }
    TimerEngine::new(settings)
}

fn save_state(ctl: &Controller) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(ctl.engine())?;
    ctl.store().kv_set(ENGINE_KEY, &json)?;
    ctl.store().kv_set(TASK_KEY, ctl.task_id().unwrap_or_default())?;
    Ok(())
}

/// Events gathered across controller calls, plus the first store failure.
#[derive(Default)]
struct Collected {
    events: Vec<Event>,
    failure: Option<CoreError>,
}

impl Collected {
    fn absorb(&mut self, result: DispatchResult) {
        match result {
            Ok(events) => self.events.extend(events),
            Err(e) => {
                warn!(error = %e.source, "timer side effect failed");
                self.events.extend(e.events);
                self.failure.get_or_insert(e.source);
            }
        }
    }
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}

fn apply(ctl: &mut Controller, action: TimerAction) -> pomoflow_core::error::Result<DispatchResult> {
    let running = ctl.is_running();
    let result = match action {
        TimerAction::Toggle => ctl.toggle(),
        TimerAction::Start if !running => ctl.toggle(),
        TimerAction::Pause if matches!(ctl.engine().state(), TimerState::Countdown { .. }) => {
            ctl.toggle()
        }
        TimerAction::Start | TimerAction::Pause => Ok(Vec::new()),
        TimerAction::Stop => ctl.stop_flow_session(),
        TimerAction::Interrupt => ctl.interrupt(),
        TimerAction::Reset { mode, auto_start } => {
            let mode = mode.unwrap_or_else(|| ctl.engine().mode());
            ctl.reset(mode, auto_start)
        }
        TimerAction::Mode { mode } => ctl.mode_change(mode),
        TimerAction::Attach { task_id } => {
            if let Some(id) = &task_id {
                ctl.store()
                    .get_task(id)?
                    .ok_or_else(|| pomoflow_core::ValidationError::NotFound {
                        kind: "task",
                        id: id.clone(),
                    })?;
            }
            ctl.set_task(task_id);
            Ok(Vec::new())
        }
        TimerAction::Status | TimerAction::Watch => Ok(Vec::new()),
    };
    Ok(result)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let engine = load_engine(&db, &config.timer);
    let task_id = db.kv_get(TASK_KEY)?.filter(|id| !id.is_empty());

    let mut ctl = TimerController::new(
        config.timer.clone(),
        Arc::new(SystemClock),
        db,
        TerminalNotifier,
    )
    .with_engine(engine);
    ctl.set_task(task_id);
    ctl.set_settings(config.timer);

    let watching = matches!(action, TimerAction::Watch);
    // Catch up on whatever happened since the last invocation. A failed
    // write there still lets the requested command run.
    let mut collected = Collected::default();
    collected.absorb(ctl.refresh());
    let applied = apply(&mut ctl, action).map(|result| collected.absorb(result));
    save_state(&ctl)?;
    print_events(&collected.events)?;
    applied?;
    if let Some(e) = collected.failure {
        return Err(e.into());
    }
    if watching {
        return watch(ctl);
    }
    println!("{}", serde_json::to_string_pretty(&ctl.snapshot())?);
    Ok(())
}

fn watch(ctl: Controller) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let shared = Arc::new(Mutex::new(ctl));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::new(shared.clone()).with_events(tx);
        ticker.sync().await;

        if ticker.is_active() {
            while let Some(event) = rx.recv().await {
                println!("{}", serde_json::to_string(&event)?);
                if matches!(event, Event::StateSnapshot { running: false, .. }) {
                    break;
                }
            }
        }
        ticker.stop();

        let ctl = shared.lock().await;
        save_state(&ctl)?;
        println!("{}", serde_json::to_string_pretty(&ctl.snapshot())?);
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
