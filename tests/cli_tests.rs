//! CLI smoke tests: drive the binary end to end against temporary files.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("pairwheel").unwrap()
}

fn write_roster(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("roster.csv");
    std::fs::write(&path, "id,demand\nalice,1\nbob,1\ncarol,1\ndave,1\n").unwrap();
    path
}

#[test]
fn generate_previews_without_persisting() {
    let dir = tempfile::tempdir().unwrap();
    let roster = write_roster(dir.path());
    let weights = dir.path().join("weights.json");

    cmd()
        .args(["generate", "--seed", "7"])
        .arg("--roster")
        .arg(&roster)
        .arg("--weights")
        .arg(&weights)
        .assert()
        .success()
        .stdout(predicate::str::contains("Assignment (2 groups):"))
        .stderr(predicate::str::contains("Preview only"));

    assert!(!weights.exists(), "preview must not persist weights");
}

#[test]
fn generate_commit_persists_a_verifiable_table() {
    let dir = tempfile::tempdir().unwrap();
    let roster = write_roster(dir.path());
    let weights = dir.path().join("weights.json");

    cmd()
        .args(["generate", "--commit", "--seed", "7"])
        .arg("--roster")
        .arg(&roster)
        .arg("--weights")
        .arg(&weights)
        .assert()
        .success();

    assert!(weights.exists());

    cmd()
        .arg("table")
        .arg("verify")
        .arg("--weights")
        .arg(&weights)
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight table OK (4 participants)"));
}

#[test]
fn pending_round_trip_delivers_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let roster = write_roster(dir.path());
    let weights = dir.path().join("weights.json");
    let pending = dir.path().join("pending.json");

    cmd()
        .args(["generate", "--seed", "7"])
        .arg("--roster")
        .arg(&roster)
        .arg("--weights")
        .arg(&weights)
        .arg("--pending")
        .arg(&pending)
        .assert()
        .success();

    assert!(pending.exists());
    assert!(!weights.exists(), "weights wait for the confirm step");

    cmd()
        .arg("send")
        .arg("--pending")
        .arg(&pending)
        .arg("--weights")
        .arg(&weights)
        .assert()
        .success()
        .stdout(predicate::str::contains("groups delivered"));

    assert!(weights.exists(), "confirm persists the table");
    assert!(!pending.exists(), "confirm consumes the pending round");
}

#[test]
fn generate_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let roster = write_roster(dir.path());
    let weights = dir.path().join("weights.json");

    let output = cmd()
        .args(["generate", "--seed", "7", "--format", "json"])
        .arg("--roster")
        .arg(&roster)
        .arg("--weights")
        .arg(&weights)
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["groups"].as_array().unwrap().len(), 2);
}

#[test]
fn frequency_upserts_the_roster() {
    let dir = tempfile::tempdir().unwrap();
    let roster = write_roster(dir.path());

    cmd()
        .args(["frequency", "alice", "2"])
        .arg("--roster")
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated alice to 2"));

    cmd()
        .args(["frequency", "erin", "1"])
        .arg("--roster")
        .arg(&roster)
        .assert()
        .success();

    let content = std::fs::read_to_string(&roster).unwrap();
    assert!(content.contains("alice,2"));
    assert!(content.contains("erin,1"));
}

#[test]
fn frequency_rejects_out_of_range_demand() {
    let dir = tempfile::tempdir().unwrap();
    let roster = write_roster(dir.path());

    cmd()
        .args(["frequency", "alice", "9"])
        .arg("--roster")
        .arg(&roster)
        .assert()
        .failure();
}

#[test]
fn table_verify_rejects_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("weights.json");
    std::fs::write(
        &weights,
        r#"{
            "version": "1.0.0",
            "updated_at": "2025-01-01T00:00:00Z",
            "weights": {"a": {"b": 1}, "b": {"a": 2}}
        }"#,
    )
    .unwrap();

    cmd()
        .arg("table")
        .arg("verify")
        .arg("--weights")
        .arg(&weights)
        .assert()
        .failure()
        .stderr(predicate::str::contains("asymmetric"));
}

#[test]
fn missing_roster_is_a_clean_error() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .arg("generate")
        .arg("--roster")
        .arg(dir.path().join("nope.csv"))
        .arg("--weights")
        .arg(dir.path().join("weights.json"))
        .assert()
        .failure();
}
