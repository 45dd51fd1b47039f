//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own HOME so the on-disk
//! store and config start empty.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_daymark"))
        .args(args)
        .env("HOME", home)
        .env_remove("DAYMARK_ENV")
        .env_remove("DAYMARK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, feeding `input` on stdin as `(delay, line)` steps, then
/// closing stdin. Returns the exit code, or `None` if the process was still
/// running after `limit` (it is killed).
fn run_cli_with_input(
    home: &Path,
    args: &[&str],
    input: &[(Duration, &str)],
    limit: Duration,
) -> Option<i32> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_daymark"))
        .args(args)
        .env("HOME", home)
        .env_remove("DAYMARK_ENV")
        .env_remove("DAYMARK_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn CLI command");

    let mut stdin = child.stdin.take().unwrap();
    for (delay, line) in input {
        thread::sleep(*delay);
        writeln!(stdin, "{line}").unwrap();
    }
    drop(stdin);

    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status.code().unwrap_or(-1));
        }
        thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    let _ = child.wait();
    None
}

fn sessions_today(home: &Path) -> serde_json::Value {
    let (stdout, _, code) = run_cli(home, &["stats", "today", "--json"]);
    assert_eq!(code, 0);
    json(&stdout)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout is not JSON")
}

#[test]
fn test_item_add_and_list() {
    let home = TempDir::new().unwrap();
    let (id, _, code) = run_cli(
        home.path(),
        &["item", "add", "Standup", "--date", "2030-01-02", "--time", "09:00", "--end", "09:15"],
    );
    assert_eq!(code, 0, "item add failed");

    let (stdout, _, code) = run_cli(home.path(), &["item", "list", "--filter", "all", "--json"]);
    assert_eq!(code, 0, "item list failed");
    let items = json(&stdout);
    let added = items
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == id.trim())
        .expect("added item missing from list");
    assert_eq!(added["title"], "Standup");
    assert_eq!(added["time"], "09:00");
}

#[test]
fn test_item_add_rejects_end_without_start() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["item", "add", "Lunch", "--end", "13:00"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("end time without a start time"));
}

#[test]
fn test_item_delete_requires_confirmation() {
    let home = TempDir::new().unwrap();
    let (id, _, _) = run_cli(home.path(), &["item", "add", "Dentist", "--date", "2030-01-02"]);
    let id = id.trim();

    // No answer on stdin means "no".
    let (_, _, code) = run_cli(home.path(), &["item", "delete", id]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["item", "list", "--filter", "all", "--json"]);
    assert!(stdout.contains(id));

    let (_, _, code) = run_cli(home.path(), &["--yes", "item", "delete", id]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["item", "list", "--filter", "all", "--json"]);
    assert!(!stdout.contains(id));
}

#[test]
fn test_checkin_toggle_and_streak() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["-y", "checkin", "toggle", "--theme", "study"]);
    assert_eq!(code, 0, "checkin toggle failed");
    assert!(stdout.contains("checked in"));
    assert!(stdout.contains("streak 1"));

    let (stdout, _, _) = run_cli(home.path(), &["checkin", "streak", "--theme", "Study"]);
    assert!(stdout.trim_end().ends_with('1'));
}

#[test]
fn test_checkin_theme_list_has_defaults() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["checkin", "theme", "list", "--json"]);
    assert_eq!(code, 0);
    let names: Vec<_> = json(&stdout)
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Workout", "Study", "Reading"]);
}

#[test]
fn test_tag_add_and_list() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["tag", "add", "Writing"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["tag", "list"]);
    assert!(stdout.lines().any(|l| l == "Writing"));
}

#[test]
fn test_stats_today_empty() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["stats", "today", "--json"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["total_seconds"], 0);
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.default_focus_minutes", "50"]);
    assert_eq!(code, 0, "config set failed");
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.default_focus_minutes"]);
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn test_config_get_unknown_key() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_assistant_without_key_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["assistant", "ask", "what", "is", "next?"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_focus_countdown_runs_to_completion() {
    let home = TempDir::new().unwrap();
    let code = run_cli_with_input(home.path(), &["focus", "-l", "0:02"], &[], Duration::from_secs(10));
    assert_eq!(code, Some(0), "focus did not exit after its countdown");

    let today = sessions_today(home.path());
    assert_eq!(today["total_seconds"], 2);
    assert_eq!(today["sessions"].as_array().unwrap().len(), 1);
}

#[test]
fn test_focus_paused_exits_when_input_ends() {
    let home = TempDir::new().unwrap();
    let code = run_cli_with_input(
        home.path(),
        &["focus", "-l", "0:30"],
        &[(Duration::from_millis(1500), "p")],
        Duration::from_secs(10),
    );
    assert_eq!(code, Some(0), "paused focus kept waiting after stdin closed");
}

#[test]
fn test_zero_length_focus_exits() {
    let home = TempDir::new().unwrap();
    let code = run_cli_with_input(home.path(), &["focus", "-l", "0"], &[], Duration::from_secs(10));
    assert_eq!(code, Some(0));
}

#[test]
fn test_stopwatch_finish_logs_session() {
    let home = TempDir::new().unwrap();
    let code = run_cli_with_input(
        home.path(),
        &["stopwatch", "--tag", "Work"],
        &[(Duration::from_millis(3000), "f")],
        Duration::from_secs(10),
    );
    assert_eq!(code, Some(0));

    let today = sessions_today(home.path());
    let sessions = today["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["tag"], "Work");
    assert!(today["total_seconds"].as_u64().unwrap() >= 1);
}

#[test]
fn test_confirmed_quit_discards_running_clock() {
    let home = TempDir::new().unwrap();
    let code = run_cli_with_input(
        home.path(),
        &["focus", "-l", "10:00"],
        &[(Duration::from_millis(1500), "q"), (Duration::from_millis(200), "y")],
        Duration::from_secs(10),
    );
    assert_eq!(code, Some(0));
    assert_eq!(sessions_today(home.path())["total_seconds"], 0);
}

#[test]
fn test_declined_quit_keeps_counting() {
    let home = TempDir::new().unwrap();
    // Decline, then let the countdown finish and log its full length.
    let code = run_cli_with_input(
        home.path(),
        &["focus", "-l", "0:03"],
        &[(Duration::from_millis(500), "q"), (Duration::from_millis(1500), "n")],
        Duration::from_secs(10),
    );
    assert_eq!(code, Some(0));
    assert_eq!(sessions_today(home.path())["total_seconds"], 3);
}

#[test]
fn test_focus_unknown_preset_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["focus", "--preset", "50"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("preset"));
}
