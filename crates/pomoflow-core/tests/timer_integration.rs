//! Integration tests for the timer driving a real session store.

use std::sync::Arc;

use pomoflow_core::{
    Database, Event, ManualClock, NoopNotifier, SessionStore, Task, TimerController, TimerEngine,
    TimerMode, TimerSettings, TimerState,
};

const T0: u64 = 1_767_261_600_000; // 2026-01-01T10:00:00Z

fn controller(
    settings: TimerSettings,
    db: Database,
) -> (TimerController<Database, NoopNotifier>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let ctl = TimerController::new(settings, clock.clone(), db, NoopNotifier);
    (ctl, clock)
}

#[test]
fn test_four_pomodoros_end_in_long_break() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(&dir.path().join("pomoflow.db")).unwrap();
    let task = Task::new("Write report", 4);
    db.create_task(&task).unwrap();

    let settings = TimerSettings {
        auto_start_breaks: true,
        ..TimerSettings::default()
    };
    let (mut ctl, clock) = controller(settings, db);
    ctl.set_task(Some(task.id.clone()));
    ctl.toggle().unwrap();

    let mut breaks = Vec::new();
    for _ in 0..4 {
        clock.advance_secs(25 * 60);
        ctl.tick().unwrap();
        breaks.push(ctl.engine().mode());
        let pause = if ctl.engine().mode() == TimerMode::LongBreak { 15 } else { 5 };
        clock.advance_secs(pause * 60);
        ctl.tick().unwrap();
        assert_eq!(ctl.engine().mode(), TimerMode::Work);
    }

    assert_eq!(
        breaks,
        vec![
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::ShortBreak,
            TimerMode::LongBreak
        ]
    );
    assert_eq!(ctl.engine().session_count(), 4);

    let sessions = ctl.store().list().unwrap();
    assert_eq!(sessions.len(), 4);
    assert!(sessions.iter().all(|s| s.duration_minutes == 25 && !s.interrupted));
    let stored = ctl.store().get_task(&task.id).unwrap().unwrap();
    assert_eq!(stored.actual_pomodoros, 4);
}

#[test]
fn test_suspended_countdown_completes_once_on_resume() {
    let db = Database::open_memory().unwrap();
    let (mut ctl, clock) = controller(TimerSettings::default(), db);
    ctl.toggle().unwrap();

    // Nothing ticks for an hour, then resume and a racing tick both fire.
    clock.advance_secs(60 * 60);
    let first = ctl.refresh().unwrap();
    let second = ctl.tick().unwrap();

    let finished = |events: &[Event]| {
        events
            .iter()
            .filter(|e| matches!(e, Event::SessionFinished { .. }))
            .count()
    };
    assert_eq!(finished(&first), 1);
    assert_eq!(finished(&second), 0);
    assert_eq!(ctl.store().list().unwrap().len(), 1);
    assert_eq!(ctl.engine().mode(), TimerMode::ShortBreak);
    assert!(!ctl.is_running());
}

#[test]
fn test_flow_session_records_actual_length() {
    let db = Database::open_memory().unwrap();
    let settings = TimerSettings {
        flow_mode_enabled: true,
        ..TimerSettings::default()
    };
    let (mut ctl, clock) = controller(settings, db);

    ctl.toggle().unwrap();
    assert!(matches!(ctl.engine().state(), TimerState::Flow { .. }));
    clock.advance_secs(52 * 60);
    ctl.tick().unwrap();
    ctl.stop_flow_session().unwrap();

    let sessions = ctl.store().list().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration_minutes, 52);
    assert!(!sessions[0].interrupted);
    assert_eq!(ctl.engine().session_count(), 1);
    assert_eq!(ctl.engine().mode(), TimerMode::ShortBreak);
}

#[test]
fn test_interrupt_records_partial_work() {
    let db = Database::open_memory().unwrap();
    let (mut ctl, clock) = controller(TimerSettings::default(), db);
    ctl.toggle().unwrap();
    clock.advance_secs(10 * 60);
    ctl.interrupt().unwrap();

    let sessions = ctl.store().list().unwrap();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].interrupted);
    assert_eq!(sessions[0].duration_minutes, 10);
    assert_eq!(ctl.engine().session_count(), 0);
    assert_eq!(ctl.engine().time_left_secs(), 25 * 60);
    assert!(!ctl.is_running());
}

#[test]
fn test_saved_engine_catches_up_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomoflow.db");

    {
        let db = Database::open_at(&path).unwrap();
        let (mut ctl, _clock) = controller(TimerSettings::default(), db);
        ctl.toggle().unwrap();
        let saved = serde_json::to_string(ctl.engine()).unwrap();
        ctl.store().kv_set("timer_engine", &saved).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let saved = db.kv_get("timer_engine").unwrap().unwrap();
    let engine: TimerEngine = serde_json::from_str(&saved).unwrap();
    let (ctl, clock) = controller(TimerSettings::default(), db);
    let mut ctl = ctl.with_engine(engine);

    clock.advance_secs(10 * 60 + 1);
    ctl.tick().unwrap();
    assert_eq!(ctl.engine().time_left_secs(), 15 * 60 - 1);
    assert!(ctl.is_running());
}

#[test]
fn test_mode_change_discards_run() {
    let db = Database::open_memory().unwrap();
    let (mut ctl, clock) = controller(TimerSettings::default(), db);
    ctl.toggle().unwrap();
    clock.advance_secs(5 * 60);
    ctl.mode_change(TimerMode::LongBreak).unwrap();

    assert_eq!(ctl.engine().mode(), TimerMode::LongBreak);
    assert_eq!(ctl.engine().state(), TimerState::Idle);
    assert_eq!(ctl.engine().time_left_secs(), 15 * 60);
    assert!(ctl.store().list().unwrap().is_empty());
}
