//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated HOME and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_countdown-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("COUNTDOWN_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse JSON line"))
        .collect()
}

#[test]
fn test_format_elapsed() {
    let home = tempfile::tempdir().unwrap();
    for (secs, expected) in [("65", "01:05"), ("0", "00:00"), ("3661", "61:01")] {
        let (stdout, _, code) = run_cli(home.path(), &["format", "elapsed", secs]);
        assert_eq!(code, 0, "format elapsed {secs} failed");
        assert_eq!(stdout.trim(), expected);
    }
}

#[test]
fn test_format_does_not_create_config() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["format", "elapsed", "65"]);
    assert_eq!(code, 0);
    assert!(!home.path().join(".config").exists());
}

#[test]
fn test_format_now() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["format", "now"]);
    assert_eq!(code, 0, "format now failed");
    assert_eq!(stdout.trim().len(), "DD.MM.YYYY HH:MM:SS".len());
}

#[test]
fn test_run_rejects_invalid_duration() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run", "--duration", "0", "--no-input"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid duration"), "stderr: {stderr}");

    let (_, stderr, code) = run_cli(home.path(), &["run", "--duration", "-3", "--no-input"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid duration"), "stderr: {stderr}");
}

#[test]
fn test_run_rejects_zero_interval() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["run", "--duration", "5", "--interval", "0", "--no-input"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid notification interval"), "stderr: {stderr}");
}

#[test]
fn test_run_duration_flag_overrides_invalid_file() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".config").join("countdown");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[timer]\nduration_secs = 0\n").unwrap();

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &["run", "--duration", "3", "--tick-ms", "5", "--json", "--no-input"],
    );
    assert_eq!(code, 0, "run failed: {stderr}");
    let events = json_lines(&stdout);
    assert_eq!(events[0]["type"], "timer_started");
    assert_eq!(events[0]["duration_secs"], 3);
    assert_eq!(events.last().unwrap()["type"], "timer_finished");

    let (_, stderr, code) = run_cli(home.path(), &["run", "--no-input"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid duration"), "stderr: {stderr}");
}

#[test]
fn test_run_emits_json_events_until_finished() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "run",
            "--duration",
            "10",
            "--interval",
            "4",
            "--tick-ms",
            "5",
            "--json",
            "--no-input",
        ],
    );
    assert_eq!(code, 0, "run failed: {stderr}");

    let events = json_lines(&stdout);
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .filter(|kind| *kind != "tick")
        .collect();
    assert_eq!(
        kinds,
        vec![
            "timer_started",
            "notified",
            "notified",
            "timer_completed",
            "timer_finished",
        ]
    );

    let notified: Vec<u64> = events
        .iter()
        .filter(|e| e["type"] == "notified")
        .map(|e| e["elapsed_secs"].as_u64().unwrap())
        .collect();
    assert_eq!(notified, vec![4, 8]);

    let last_tick = events.iter().rev().find(|e| e["type"] == "tick").unwrap();
    assert_eq!(last_tick["elapsed_secs"], 10);
    assert_eq!(last_tick["progress"][0], 1.0);
}

#[test]
fn test_run_text_output() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--duration", "2", "--tick-ms", "5", "--no-input"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("00:02 / 00:02"));
    assert!(stdout.contains("timer finished"));
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.duration_secs"]);
    assert_eq!(code, 0, "Config get failed");
    assert_eq!(stdout.trim(), "60");
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set", "timer.notification_interval", "300"],
    );
    assert_eq!(code, 0, "Config set failed");

    let (stdout, _, code) = run_cli(
        home.path(),
        &["config", "get", "timer.notification_interval"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "300");
}

#[test]
fn test_config_set_rejects_bad_values() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.bogus", "1"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.duration_secs", "0"]);
    assert_eq!(code, 1);

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.duration_secs"]);
    assert_eq!(stdout.trim(), "60");
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["auto_restart"], false);
    assert_eq!(parsed["runtime"]["tick_ms"], 1000);
}
