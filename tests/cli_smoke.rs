//! Behavioural smoke tests for the CLI entrypoints.

use assert_cmd::Command;
use predicates::prelude::*;

fn poller_cmd() -> Command {
    let mut cmd = Command::cargo_bin("volumapper").unwrap_or_else(|err| panic!("binary: {err}"));
    cmd.env_remove("VOLUMAPPER_FAKE_POLL_MODE")
        .env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY");
    cmd
}

fn janitor_cmd() -> Command {
    Command::cargo_bin("volumapper-janitor").unwrap_or_else(|err| panic!("binary: {err}"))
}

#[test]
fn help_documents_the_poller() {
    poller_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Map EBS volumes"))
        .stdout(predicate::str::contains("--region"));
}

#[test]
fn missing_credentials_fail_fast_without_table_output() {
    poller_cmd()
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("AWS_ACCESS_KEY_ID"));
}

#[test]
fn fake_sample_mode_renders_mapping_table() {
    poller_cmd()
        .env("VOLUMAPPER_FAKE_POLL_MODE", "sample")
        .assert()
        .success()
        .stdout(predicate::str::contains("i-1"))
        .stdout(predicate::str::contains("vol-1"))
        .stdout(predicate::str::contains("vol-2"))
        .stdout(predicate::str::contains("(unattached)"));
}

#[test]
fn fake_sample_mode_hides_unattached_with_attached_only() {
    poller_cmd()
        .env("VOLUMAPPER_FAKE_POLL_MODE", "sample")
        .arg("--attached-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("vol-1"))
        .stdout(predicate::str::contains("vol-2").not());
}

#[test]
fn fake_empty_mode_reports_nothing_to_map() {
    poller_cmd()
        .env("VOLUMAPPER_FAKE_POLL_MODE", "empty")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to map"));
}

#[test]
fn janitor_requires_an_action() {
    janitor_cmd().assert().failure();
}

#[test]
fn janitor_prepare_creates_the_tree() {
    let tmp = tempfile::TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = tmp.path().join("results");

    janitor_cmd()
        .arg("--results-dir")
        .arg(&root)
        .arg("--prepare")
        .arg("AKIAEXAMPLE")
        .arg("--region")
        .arg("us-east-1")
        .assert()
        .success()
        .stdout(predicate::str::contains("prepared results tree"));

    assert!(root.join("AKIAEXAMPLE/us-east-1/instances").is_dir());
    assert!(root.join("AKIAEXAMPLE/us-east-1/volumes").is_dir());
}

#[test]
fn janitor_cleanup_fails_on_missing_tree() {
    let tmp = tempfile::TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = tmp.path().join("missing");

    janitor_cmd()
        .arg("--results-dir")
        .arg(&root)
        .arg("--cleanup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to access"));
}
