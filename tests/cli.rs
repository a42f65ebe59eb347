// ABOUTME: Integration tests for the kubectl-setimg CLI.
// ABOUTME: Covers help, version, and argument errors that fail before contacting a cluster.

use assert_cmd::Command;
use predicates::prelude::*;

fn setimg_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kubectl-setimg"));
    cmd.env_remove("SETIMG_CONFIG");
    cmd
}

#[test]
fn help_shows_modes() {
    setimg_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--list"))
        .stdout(predicate::str::contains("--watch"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn version_prints_build_info() {
    setimg_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kubectl-setimg version "));
}

#[test]
fn list_without_deployment_fails() {
    let dir = tempfile::tempdir().unwrap();

    setimg_cmd()
        .current_dir(dir.path())
        .arg("--list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("deployment name is required"));
}

#[test]
fn invalid_timeout_is_rejected() {
    setimg_cmd()
        .args(["web", "app=nginx:1.25", "--timeout", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn broken_settings_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("setimg.yml"), "watch:\n  interval: 0s\n").unwrap();

    setimg_cmd()
        .current_dir(dir.path())
        .args(["web", "app=nginx:1.25"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("watch.interval"));
}

#[test]
fn quiet_and_json_conflict() {
    setimg_cmd()
        .args(["--quiet", "--json", "--list", "web"])
        .assert()
        .failure();
}
