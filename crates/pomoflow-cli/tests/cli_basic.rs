//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temporary
//! directory, so config and database never touch the real user data.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomoflow-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("POMOFLOW_ENV")
        .env_remove("POMOFLOW_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

/// The last pretty-printed JSON object on stdout.
fn last_json(stdout: &str) -> serde_json::Value {
    let start = stdout.rfind("\n{").map_or(0, |i| i + 1);
    serde_json::from_str(&stdout[start..]).expect("stdout ends with a JSON object")
}

#[test]
fn test_timer_status_on_fresh_install() {
    let home = tempfile::tempdir().unwrap();
    let status = last_json(&run_ok(home.path(), &["timer", "status"]));
    assert_eq!(status["type"], "state_snapshot");
    assert_eq!(status["mode"], "work");
    assert_eq!(status["running"], false);
    assert_eq!(status["time_left_secs"], 1500);
}

#[test]
fn test_timer_start_then_pause_persists() {
    let home = tempfile::tempdir().unwrap();
    let started = last_json(&run_ok(home.path(), &["timer", "start"]));
    assert_eq!(started["running"], true);

    let paused = last_json(&run_ok(home.path(), &["timer", "pause"]));
    assert_eq!(paused["running"], false);
    assert_eq!(paused["state"]["state"], "idle");

    let status = last_json(&run_ok(home.path(), &["timer", "status"]));
    assert_eq!(status["running"], false);
}

#[test]
fn test_timer_mode_change() {
    let home = tempfile::tempdir().unwrap();
    let status = last_json(&run_ok(home.path(), &["timer", "mode", "long-break"]));
    assert_eq!(status["mode"], "longBreak");
    assert_eq!(status["time_left_secs"], 900);
}

#[test]
fn test_interrupt_shows_up_in_stats() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["timer", "start"]);
    run_ok(home.path(), &["timer", "interrupt"]);

    let stats: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["stats", "all"])).unwrap();
    assert_eq!(stats["total_pomodoros"], 0);
    assert_eq!(stats["total_interrupted"], 1);
    assert_eq!(stats["completion_rate"], 0);
    assert_eq!(stats["this_week"].as_array().unwrap().len(), 7);
}

#[test]
fn test_task_and_project_lifecycle() {
    let home = tempfile::tempdir().unwrap();
    let project: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["project", "create", "Writing"])).unwrap();
    let project_id = project["id"].as_str().unwrap().to_string();

    let task: serde_json::Value = serde_json::from_str(&run_ok(
        home.path(),
        &["task", "create", "Draft chapter", "--project-id", &project_id, "--estimated-pomodoros", "3"],
    ))
    .unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["estimatedPomodoros"], 3);

    run_ok(home.path(), &["timer", "attach", &task_id]);
    run_ok(home.path(), &["task", "complete", &task_id]);

    let tasks: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["task", "list"])).unwrap();
    assert_eq!(tasks[0]["completed"], true);

    let (_, _, code) = run_cli(home.path(), &["task", "create", "Orphan", "--project-id", "nope"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_empty() {
    let home = tempfile::tempdir().unwrap();
    let stats: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["stats", "all"])).unwrap();
    assert_eq!(stats["total_pomodoros"], 0);
    assert_eq!(stats["completion_rate"], 100);
    assert_eq!(stats["current_streak"], 0);

    let summary = run_ok(home.path(), &["stats", "summary"]);
    assert!(summary.contains("Today: 0/8 pomodoros (0m)"));
}

#[test]
fn test_config_roundtrip_and_validation() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(home.path(), &["config", "get", "timer.work_duration_minutes"]).trim(), "25");

    run_ok(home.path(), &["config", "set", "timer.work_duration_minutes", "50"]);
    assert_eq!(run_ok(home.path(), &["config", "get", "timer.work_duration_minutes"]).trim(), "50");

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "timer.work_duration_minutes", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["config", "get", "timer.bogus"]);
    assert_ne!(code, 0);

    // A fresh idle timer picks up the new length.
    let status = last_json(&run_ok(home.path(), &["timer", "status"]));
    assert_eq!(status["time_left_secs"], 3000);
}
