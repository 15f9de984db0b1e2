//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own database and config file.

use std::path::PathBuf;
use std::process::Command;

const NOW: &str = "2026-03-02T08:00:00Z";

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_autoplan"))
            .arg("--db")
            .arg(self.path("autoplan.db"))
            .arg("--config")
            .arg(self.path("config.toml"))
            .args(["--now", NOW, "--user", "alice"])
            .args(args)
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to execute autoplan");

        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        )
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "autoplan {args:?} failed: {stderr}");
        stdout
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_ok(args);
        serde_json::from_str(&stdout).expect("stdout is JSON")
    }

    fn add_example_calendar(&self) {
        self.run_ok(&[
            "event", "add", "Standup",
            "--start", "2026-03-02T10:00:00Z",
            "--end", "2026-03-02T11:00:00Z",
        ]);
        self.run_ok(&[
            "event", "add", "Lunch",
            "--start", "2026-03-02T13:00:00Z",
            "--end", "2026-03-02T13:30:00Z",
        ]);
    }
}

fn starts(value: &serde_json::Value, field: Option<&str>) -> Vec<String> {
    value
        .as_array()
        .expect("JSON array")
        .iter()
        .map(|item| {
            let interval = match field {
                Some(f) => &item[f],
                None => item,
            };
            interval["start"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

#[test]
fn test_slots_for_example_day() {
    let sb = Sandbox::new();
    sb.add_example_calendar();

    let slots = sb.run_json(&["slots", "--date", "2026-03-02", "--json"]);
    assert_eq!(
        starts(&slots, None),
        vec![
            "2026-03-02T09:00:00Z",
            "2026-03-02T11:00:00Z",
            "2026-03-02T13:30:00Z"
        ]
    );
}

#[test]
fn test_schedule_auto_places_task() {
    let sb = Sandbox::new();
    sb.add_example_calendar();
    let out = sb.run_ok(&[
        "task", "add", "Write report",
        "--due", "2026-03-03T12:00:00Z",
        "--priority", "10",
        "--minutes", "90",
    ]);
    assert!(out.starts_with("Task created:"));

    let report = sb.run_json(&["schedule", "auto", "--json"]);
    assert_eq!(starts(&report["placed"], Some("interval")), vec!["2026-03-02T11:00:00Z"]);
    assert_eq!(report["placed"][0]["interval"]["end"], "2026-03-02T12:30:00Z");
    assert_eq!(report["placed"][0]["tag"], "auto-scheduled");
    assert_eq!(report["unscheduled"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_focus_suggest_then_protect() {
    let sb = Sandbox::new();
    sb.add_example_calendar();

    let suggested = sb.run_json(&["focus", "suggest", "--json"]);
    assert_eq!(suggested.as_array().map(Vec::len), Some(7));
    assert_eq!(suggested[0]["start"], "2026-03-02T11:00:00Z");
    assert_eq!(suggested[0]["end"], "2026-03-02T13:00:00Z");

    let protected = sb.run_json(&["focus", "protect", "--json"]);
    assert_eq!(protected.as_array().map(Vec::len), Some(7));
    assert_eq!(protected[1]["interval"]["start"], "2026-03-03T09:00:00Z");
    assert_eq!(protected[1]["interval"]["end"], "2026-03-03T11:00:00Z");

    let events = sb.run_json(&["event", "list", "--json"]);
    assert_eq!(events.as_array().map(Vec::len), Some(9));
}

#[test]
fn test_config_set_changes_work_day() {
    let sb = Sandbox::new();
    sb.run_ok(&["config", "set", "work_day.end", "12:00"]);
    assert_eq!(sb.run_ok(&["config", "get", "work_day.end"]).trim(), "12:00");

    let slots = sb.run_json(&["slots", "--date", "2026-03-02", "--json"]);
    assert_eq!(slots[0]["end"], "2026-03-02T12:00:00Z");
}

#[test]
fn test_invalid_input_fails() {
    let sb = Sandbox::new();
    let (_, stderr, code) = sb.run(&["config", "set", "work_day.start", "nine"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = sb.run(&[
        "event", "add", "Backwards",
        "--start", "2026-03-02T11:00:00Z",
        "--end", "2026-03-02T10:00:00Z",
    ]);
    assert_ne!(code, 0);
    assert_eq!(sb.run_ok(&["event", "list"]).trim(), "No commitments.");
}

#[test]
fn test_delete_unknown_ids_fail() {
    let sb = Sandbox::new();
    let (_, stderr, code) = sb.run(&["task", "delete", "missing-task"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("task not found"));

    let (_, stderr, code) = sb.run(&["event", "delete", "missing-event"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("commitment not found"));
}

#[test]
fn test_nanosecond_event_keeps_calendar_readable() {
    let sb = Sandbox::new();
    sb.run_ok(&[
        "event", "add", "Blip",
        "--start", "2026-03-02T10:00:00.000000100Z",
        "--end", "2026-03-02T10:00:00.000000600Z",
    ]);

    let suggested = sb.run_json(&["focus", "suggest", "--json"]);
    assert_eq!(suggested[0]["start"], "2026-03-02T10:00:00.000000600Z");
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let sb = Sandbox::new();
    let (stdout, stderr, code) = sb.run(&["--verbose", "slots", "--json"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("opening database"));
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());
}
