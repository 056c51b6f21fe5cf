//! CLI integration tests for rota
//!
//! These tests drive the real binary through init, queries, manual
//! rotation and roster edits, checking the commands work together.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the rota binary
fn rota_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("rota"));
    cmd.env_remove("ROTA_PROJECT").env_remove("RUST_LOG");
    cmd
}

/// Create a weekly project for alice, bob and carol starting 2024-01-01
fn setup_project() -> TempDir {
    setup_project_with(&[])
}

fn setup_project_with(extra: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    rota_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["-m", "alice", "-m", "bob", "-m", "carol"])
        .args(["--start", "2024-01-01"])
        .args(extra)
        .assert()
        .success();
    dir
}

fn json_output(dir: &TempDir, args: &[&str]) -> Value {
    let output = rota_cmd()
        .current_dir(dir.path())
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {:?}", args);
    serde_json::from_slice(&output.stdout).unwrap()
}

fn read_only_owner(dir: &TempDir) -> String {
    let output = rota_cmd()
        .current_dir(dir.path())
        .args(["current", "--read-only"])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    rota_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["-m", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized rota project"));

    assert!(dir.path().join(".rota").is_dir());
    assert!(dir.path().join(".rota/config.toml").is_file());
    assert!(dir.path().join(".rota/.gitignore").is_file());

    let config = fs::read_to_string(dir.path().join(".rota/config.toml")).unwrap();
    assert!(config.contains("alice"));
}

#[test]
fn test_init_twice_fails() {
    let dir = setup_project();

    rota_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["-m", "dave"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_requires_member() {
    let dir = TempDir::new().unwrap();

    rota_cmd().arg("init").arg(dir.path()).assert().failure();
}

#[test]
fn test_init_rejects_unknown_frequency() {
    let dir = TempDir::new().unwrap();

    rota_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["-m", "alice", "--frequency", "hourly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported frequency"));

    assert!(!dir.path().join(".rota").exists());
}

#[test]
fn test_init_rejects_custom_without_interval() {
    let dir = TempDir::new().unwrap();

    rota_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["-m", "alice", "--frequency", "custom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval"));
}

#[test]
fn test_outside_project_fails() {
    let dir = TempDir::new().unwrap();

    rota_cmd()
        .current_dir(dir.path())
        .arg("current")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a rota project"));
}

// =============================================================================
// Duty Tests
// =============================================================================

#[test]
fn test_read_only_current_seeds_first_member() {
    let dir = setup_project();

    assert_eq!(read_only_owner(&dir), "alice");
    assert!(dir.path().join(".rota/state.json").is_file());
}

#[test]
fn test_current_rotates_once_after_period_ends() {
    let dir = setup_project();

    // The seeded rotation started in 2024, so a new week has begun since
    rota_cmd()
        .current_dir(dir.path())
        .arg("current")
        .assert()
        .success()
        .stdout("bob\n");

    // Same period now: no second rotation
    rota_cmd()
        .current_dir(dir.path())
        .arg("current")
        .assert()
        .success()
        .stdout("bob\n");
}

#[test]
fn test_skip_advances_and_wraps() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .arg("skip")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped to bob"));

    rota_cmd().current_dir(dir.path()).arg("skip").assert().success();
    rota_cmd()
        .current_dir(dir.path())
        .arg("skip")
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped to alice"));

    assert_eq!(read_only_owner(&dir), "alice");
}

#[test]
fn test_skip_then_current_keeps_skipped_owner() {
    let dir = setup_project();

    rota_cmd().current_dir(dir.path()).arg("skip").assert().success();

    // The skip reset the period clock to now
    rota_cmd()
        .current_dir(dir.path())
        .arg("current")
        .assert()
        .success()
        .stdout("bob\n");
}

#[test]
fn test_set_owner() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .args(["set", "carol"])
        .assert()
        .success()
        .stdout(predicate::str::contains("carol is now on duty"));

    assert_eq!(read_only_owner(&dir), "carol");

    rota_cmd()
        .current_dir(dir.path())
        .args(["set", "zed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Roster member not found: zed"));

    assert_eq!(read_only_owner(&dir), "carol");
}

#[test]
fn test_notify_json() {
    let dir = setup_project();

    let note = json_output(&dir, &["notify"]);
    assert_eq!(note["owner"]["identity"], "bob");
    assert_eq!(note["periodInfo"]["kind"], "week");
    assert!(note["periodInfo"]["startInstant"].is_string());
}

// =============================================================================
// Preview Tests
// =============================================================================

#[test]
fn test_owner_on_date() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .args(["on", "2024-01-10"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("bob\tweek 2 of 2024"));

    let json = json_output(&dir, &["on", "2024-01-24"]);
    assert_eq!(json["owner"]["identity"], "alice");
    assert_eq!(json["periodInfo"]["periodNumber"], 4);
}

#[test]
fn test_owner_on_invalid_date() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .args(["on", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_schedule_json() {
    let dir = setup_project();

    let schedule = json_output(&dir, &["schedule", "-n", "3"]);
    let entries = schedule.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let positions: Vec<i64> = entries
        .iter()
        .map(|e| e["periodNumber"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 2, 3]);

    // Consecutive weeks go to consecutive members
    let owners: Vec<&str> = entries
        .iter()
        .map(|e| e["owner"]["identity"].as_str().unwrap())
        .collect();
    let roster = ["alice", "bob", "carol"];
    let first = roster.iter().position(|m| *m == owners[0]).unwrap();
    for (i, owner) in owners.iter().enumerate() {
        assert_eq!(*owner, roster[(first + i) % 3]);
    }
}

#[test]
fn test_schedule_defaults_to_config_length() {
    let dir = setup_project();

    let schedule = json_output(&dir, &["schedule"]);
    assert_eq!(schedule.as_array().unwrap().len(), 4);
}

#[test]
fn test_period_with_friday_week_start() {
    let dir = setup_project_with(&["--week-start-day", "5"]);

    let period = json_output(&dir, &["period", "--date", "2025-01-20"]);
    assert_eq!(period["startInstant"], "2025-01-17T00:00:00Z");
    assert_eq!(period["endInstant"], "2025-01-23T23:59:59.999Z");
}

#[test]
fn test_period_text() {
    let dir = setup_project_with(&["--frequency", "monthly"]);

    rota_cmd()
        .current_dir(dir.path())
        .args(["period", "--date", "2024-02-10"])
        .assert()
        .success()
        .stdout("month 2 of 2024 (2024-02-01 to 2024-02-29)\n");
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_validate_clean_state() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rotation state is valid"));
}

#[test]
fn test_validate_reports_bad_pointer() {
    let dir = setup_project();
    assert_eq!(read_only_owner(&dir), "alice");

    let path = dir.path().join(".rota/state.json");
    let mut state: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    state["currentIndex"] = Value::from(9);
    fs::write(&path, serde_json::to_string_pretty(&state).unwrap()).unwrap();

    rota_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("out of range"));

    rota_cmd()
        .current_dir(dir.path())
        .args(["current", "--read-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_validate_lists_every_problem() {
    let dir = setup_project();
    assert_eq!(read_only_owner(&dir), "alice");

    let path = dir.path().join(".rota/state.json");
    let mut state: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    state["lastRotationInstant"] = Value::from("not-a-date");
    state["config"]["week_start_day"] = Value::from(9);
    state["config"]["month_day"] = Value::from(40);
    fs::write(&path, serde_json::to_string_pretty(&state).unwrap()).unwrap();

    rota_cmd()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("not-a-date"))
        .stdout(predicate::str::contains("week_start_day"))
        .stdout(predicate::str::contains("month_day"))
        .stderr(predicate::str::contains("3 problem(s)"));
}

#[test]
fn test_corrupt_state_is_not_overwritten() {
    let dir = setup_project();
    let path = dir.path().join(".rota/state.json");
    fs::write(&path, "garbage").unwrap();

    rota_cmd()
        .current_dir(dir.path())
        .arg("skip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));

    assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");
}

// =============================================================================
// Roster Tests
// =============================================================================

#[test]
fn test_roster_add_and_list() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .args(["roster", "add", "dave"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added dave"));

    let rows = json_output(&dir, &["roster", "list"]);
    let ids: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["identity"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["alice", "bob", "carol", "dave"]);
    assert_eq!(rows[0]["current"], true);

    rota_cmd()
        .current_dir(dir.path())
        .args(["roster", "add", "bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_roster_remove_current_hands_over() {
    let dir = setup_project();

    rota_cmd()
        .current_dir(dir.path())
        .args(["roster", "remove", "alice"])
        .assert()
        .success();

    assert_eq!(read_only_owner(&dir), "bob");
}

#[test]
fn test_roster_keeps_last_member() {
    let dir = TempDir::new().unwrap();
    rota_cmd()
        .arg("init")
        .arg(dir.path())
        .args(["-m", "solo"])
        .assert()
        .success();

    rota_cmd()
        .current_dir(dir.path())
        .args(["roster", "remove", "solo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("roster would be empty"));
}

#[test]
fn test_project_flag_from_elsewhere() {
    let dir = setup_project();
    let elsewhere = TempDir::new().unwrap();

    rota_cmd()
        .current_dir(elsewhere.path())
        .arg("--project")
        .arg(dir.path())
        .args(["current", "--read-only"])
        .assert()
        .success()
        .stdout("alice\n");
}
