use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn desk(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("contentdesk").unwrap();
    cmd.env("CONTENTDESK_HOME", home).env_remove("CONTENTDESK_LOG");
    cmd
}

#[test]
fn test_config_set_and_show() {
    let temp_dir = tempfile::tempdir().unwrap();

    desk(temp_dir.path())
        .args(["config", "owner", "springfield-elementary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("owner set to springfield-elementary"));

    desk(temp_dir.path())
        .args(["config", "owner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("springfield-elementary"));

    desk(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("owner = springfield-elementary"))
        .stdout(predicate::str::contains("api-base = https://api.github.com"))
        .stdout(predicate::str::contains("token = (not set)"));
}

#[test]
fn test_token_is_never_printed() {
    let temp_dir = tempfile::tempdir().unwrap();

    desk(temp_dir.path())
        .args(["config", "token", "ghp_abcdef0123456789"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ghp_****"))
        .stdout(predicate::str::contains("abcdef").not());

    desk(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("abcdef").not());

    let saved = std::fs::read_to_string(temp_dir.path().join("config.json")).unwrap();
    assert!(saved.contains("ghp_abcdef0123456789"));
}

#[test]
fn test_unknown_config_key_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    desk(temp_dir.path())
        .args(["config", "colour", "blue"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_new_notice_id() {
    let temp_dir = tempfile::tempdir().unwrap();
    desk(temp_dir.path())
        .args(["notice", "new-id"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^NOTICE-[0-9A-Z]+-[0-9A-Z]{5}\n$").unwrap());
}

#[test]
fn test_unconfigured_store_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    desk(temp_dir.path())
        .args(["notice", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be configured"));

    desk(temp_dir.path())
        .args(["folders", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be configured"));
}

#[test]
fn test_managed_roots_cannot_be_deleted() {
    let temp_dir = tempfile::tempdir().unwrap();
    desk(temp_dir.path())
        .args(["folders", "delete", "Gallery", "", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("protected folder"));

    desk(temp_dir.path())
        .args(["folders", "delete", "Notices", "old", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_bad_arguments_fail_before_any_request() {
    let temp_dir = tempfile::tempdir().unwrap();

    desk(temp_dir.path())
        .args([
            "achievement", "add", "--folder", "fair", "--title", "Fair", "--category", "Sports",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown achievement category"));

    desk(temp_dir.path())
        .args(["notice", "add", "--title", "Exams", "--date", "12/04/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_strict_flag_does_not_persist() {
    let temp_dir = tempfile::tempdir().unwrap();
    desk(temp_dir.path())
        .args(["--strict", "config", "strict-reads"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));
}
