//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own config directory.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(dir: &TempDir, args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(dir, args, "")
}

fn run_cli_with_input(dir: &TempDir, args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_lanepace"))
        .args(args)
        .env("LANEPACE_CONFIG_DIR", dir.path())
        .env_remove("LANEPACE_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn signal_kinds(effects: &serde_json::Value) -> Vec<String> {
    effects
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["effect"]["type"] == "signal")
        .map(|e| e["effect"]["kind"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_config_path_is_inside_override() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(&*dir.path().to_string_lossy()));
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["config", "get", "lanes.count"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "8");

    let (code, _, _) = run_cli(&dir, &["config", "set", "lanes.count", "4"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "lanes.count"]);
    assert_eq!(stdout.trim(), "4");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["config", "set", "lanes.count", "many"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error"));

    let (code, _, _) = run_cli(&dir, &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_list_json() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["config", "list", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["tick_interval_ms"], 100);
    assert_eq!(parsed["lanes"]["name_prefix"], "Lane");
}

#[test]
fn test_series_pyramid_json() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["series", "pyramid", "30", "3", "--json"]);
    assert_eq!(code, 0);
    let sets: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sets.as_array().unwrap().len(), 5);
}

#[test]
fn test_series_save_and_show() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["series", "simple", "4", "60", "20", "--save"]);
    assert_eq!(code, 0);
    let (code, stdout, _) = run_cli(&dir, &["series", "show", "--json"]);
    assert_eq!(code, 0);
    let sets: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sets.as_array().unwrap().len(), 1);

    let (code, _, _) = run_cli(&dir, &["series", "clear"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["series", "show", "--json"]);
    assert_eq!(stdout.trim(), "[]");
}

#[test]
fn test_series_rejects_zero_steps() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["series", "pyramid", "30", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_session_simulate_send_off() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &dir,
        &[
            "session",
            "simulate",
            "--mode",
            "send_off",
            "--lanes",
            "2",
            "--interval",
            "2:30:10",
            "--seconds",
            "120",
            "--json",
        ],
    );
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let kinds = signal_kinds(&report["effects"]);
    assert_eq!(kinds.first().map(String::as_str), Some("start"));
    assert_eq!(kinds.last().map(String::as_str), Some("series_complete"));
    assert_eq!(report["snapshot"]["run_state"], "idle");
    assert!(report["simulated_ms"].as_u64().unwrap() <= 120_000);
}

#[test]
fn test_session_simulate_count_up() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &dir,
        &[
            "session", "simulate", "--mode", "count_up", "--lanes", "3", "--seconds", "5", "--json",
        ],
    );
    assert_eq!(code, 0);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["simulated_ms"], 5000);
    let lanes = report["snapshot"]["lanes"].as_array().unwrap();
    assert_eq!(lanes.len(), 3);
    assert!(lanes.iter().all(|l| l["current_ms"] == 5000));
}

#[test]
fn test_session_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(
        &dir,
        &["session", "simulate", "--mode", "sprint", "--seconds", "1"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("sprint"));
}

#[test]
fn test_stopwatch_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli_with_input(
        &dir,
        &["stopwatch", "--athletes", "2", "--json"],
        "1\ns 1\n1\nq\n",
    );
    assert_eq!(code, 0);
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let split = rows.iter().find(|r| r.get("split").is_some()).unwrap();
    assert_eq!(split["athlete"], 1);
    assert_eq!(split["split"]["lap_index"], 1);

    let first = rows.iter().rev().find(|r| r["athlete"] == 1 && r.get("running").is_some());
    assert_eq!(first.unwrap()["running"], false);
}

#[test]
fn test_program_simulate_json() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &dir,
        &[
            "program", "--work", "2", "--rest", "1", "--repeats", "2", "--simulate", "--json",
        ],
    );
    assert_eq!(code, 0);
    let kinds: Vec<String> = stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .filter(|e| e["effect"]["type"] == "signal")
        .map(|e| e["effect"]["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["start", "send_off", "send_off", "send_off", "series_complete"]
    );
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("lanepace"));
}
