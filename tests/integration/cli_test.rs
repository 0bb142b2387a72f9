use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn tasktrack(file: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("tasktrack-cli").unwrap();
    cmd.env_remove("TASKTRACK_FILE")
        .env_remove("RUST_LOG")
        .arg("--file")
        .arg(file);
    cmd
}

fn task_file(dir: &TempDir) -> PathBuf {
    dir.path().join("tasks.json")
}

fn json_out(cmd: &mut Command) -> Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn add_creates_file_and_numbers_tasks() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);

    tasktrack(&file)
        .args(["add", "Write the quarterly report"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Created task 1"));
    tasktrack(&file)
        .args(["add", "Review the team roadmap", "-p", "high"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Created task 2"));

    let raw = std::fs::read_to_string(&file).unwrap();
    assert!(raw.contains("\"priority\": \"High\""));
    assert!(raw.contains("\"status\": \"Pending\""));
}

#[test]
fn list_on_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    tasktrack(&task_file(&dir))
        .arg("list")
        .assert()
        .success()
        .stdout(predicates::str::contains("No tasks found."));
    assert!(!task_file(&dir).exists());
}

#[test]
fn add_sanitizes_description_and_categories() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);

    let task = json_out(tasktrack(&file).args([
        "add",
        "  Plan   the <b>spring</b> cleanup ",
        "-c",
        "home & garden",
        "-c",
        "<em>weekend</em>",
    ]));
    assert_eq!(task["description"], "Plan the spring cleanup");
    assert_eq!(task["categories"][0], "home garden");
    assert_eq!(task["categories"][1], "weekend");
}

#[test]
fn add_rejects_short_description() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "too short"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid description"));
    assert!(!file.exists());
}

#[test]
fn add_rejects_past_due_date() {
    let dir = TempDir::new().unwrap();
    tasktrack(&task_file(&dir))
        .args(["add", "Something due long ago", "--due", "2001-01-01"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("in the past"));
}

#[test]
fn add_with_explicit_id_and_conflict() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "Write integration tests", "--id", "5"])
        .assert()
        .success();
    tasktrack(&file)
        .args(["add", "Another task claiming five", "--id", "5"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("already exists"));

    let tasks = json_out(tasktrack(&file).arg("list"));
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], 5);
    assert_eq!(tasks[0]["description"], "Write integration tests");
}

#[test]
fn status_priority_and_category_updates() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "Refactor the billing module"])
        .assert()
        .success();

    tasktrack(&file)
        .args(["status", "1", "in-progress"])
        .assert()
        .success()
        .stdout(predicates::str::contains("status is now InProgress"));
    tasktrack(&file)
        .args(["priority", "1", "low"])
        .assert()
        .success();
    tasktrack(&file)
        .args(["category", "1", "backend"])
        .assert()
        .success();

    let task = json_out(tasktrack(&file).args(["show", "1"]));
    assert_eq!(task["status"], "InProgress");
    assert_eq!(task["priority"], "Low");
    assert_eq!(task["categories"][0], "backend");
}

#[test]
fn status_on_missing_task_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "The only task on record"])
        .assert()
        .success();
    let before = std::fs::read(&file).unwrap();

    tasktrack(&file)
        .args(["status", "9", "completed"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("task not found: 9"));
    assert_eq!(std::fs::read(&file).unwrap(), before);
}

#[test]
fn unknown_status_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "Task with a bad status"])
        .assert()
        .success();
    tasktrack(&file)
        .args(["status", "1", "archived"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid status"));
}

#[test]
fn script_category_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "Task for category checks"])
        .assert()
        .success();
    tasktrack(&file)
        .args(["category", "1", "<script>"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid category"));
}

#[test]
fn list_filters_and_search() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    for (desc, priority) in [
        ("Buy groceries for dinner", "high"),
        ("Call the grocery delivery", "low"),
        ("Fix the leaking faucet", "high"),
    ] {
        tasktrack(&file)
            .args(["add", desc, "-p", priority])
            .assert()
            .success();
    }
    tasktrack(&file)
        .args(["status", "3", "completed"])
        .assert()
        .success();

    let high = json_out(tasktrack(&file).args(["list", "--priority", "high"]));
    assert_eq!(high.as_array().unwrap().len(), 2);

    let open_high = json_out(tasktrack(&file).args(["list", "--status", "pending", "--priority", "high"]));
    assert_eq!(open_high.as_array().unwrap().len(), 1);
    assert_eq!(open_high[0]["id"], 1);

    let found = json_out(tasktrack(&file).args(["search", "GROCER"]));
    assert_eq!(found.as_array().unwrap().len(), 2);

    tasktrack(&file)
        .args(["search", "nothing-like-this"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No tasks matching"));
}

#[test]
fn delete_of_lower_id_keeps_numbering_after_highest() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    for desc in ["First task in sequence", "Second task in sequence"] {
        tasktrack(&file).args(["add", desc]).assert().success();
    }
    tasktrack(&file)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Deleted task 1"));
    tasktrack(&file)
        .args(["delete", "1"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("task not found: 1"));

    tasktrack(&file)
        .args(["add", "Third task in sequence"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Created task 3"));
}

#[test]
fn deleting_highest_id_frees_it_for_next_run() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    for desc in ["First task in sequence", "Second task in sequence"] {
        tasktrack(&file).args(["add", desc]).assert().success();
    }
    tasktrack(&file).args(["delete", "2"]).assert().success();

    // Each run rebuilds its counter from the ids left in the file.
    tasktrack(&file)
        .args(["add", "Replacement for the second"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Created task 2"));
}

#[test]
fn edit_description_and_due_date() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "Original description text", "--due", "2099-12-31"])
        .assert()
        .success();

    let task = json_out(tasktrack(&file).args([
        "edit",
        "1",
        "--description",
        "Updated description text",
        "--clear-due",
    ]));
    assert_eq!(task["description"], "Updated description text");
    assert!(task["dueDate"].is_null());

    tasktrack(&file)
        .args(["edit", "1"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("nothing to edit"));
}

#[test]
fn overdue_is_empty_for_future_tasks() {
    let dir = TempDir::new().unwrap();
    let file = task_file(&dir);
    tasktrack(&file)
        .args(["add", "Renew the insurance policy", "--due", "2099-01-01"])
        .assert()
        .success();
    tasktrack(&file)
        .arg("overdue")
        .assert()
        .success()
        .stdout(predicates::str::contains("No overdue tasks."));
}
