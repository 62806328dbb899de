//! Unit tests for the janitor module.

use super::*;
use crate::backend::Ec2Instance;
use crate::results_store::DataKind;
use camino::Utf8PathBuf;
use rstest::rstest;
use tempfile::TempDir;

fn results_root(tmp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(tmp.path().join("results"))
        .unwrap_or_else(|path| panic!("temp path should be utf8: {}", path.display()))
}

fn janitor_for(root: &Utf8PathBuf) -> Janitor {
    let config = JanitorConfig::new(root.clone()).unwrap_or_else(|err| panic!("config: {err}"));
    Janitor::new(config)
}

fn sample_instance() -> Ec2Instance {
    Ec2Instance {
        id: String::from("i-1"),
        name: Some(String::from("web")),
        state: String::from("running"),
        instance_type: String::from("t3.micro"),
    }
}

fn seed_snapshots(root: &Utf8PathBuf, region: &str, timestamps: &[u64]) {
    let store = ResultsStore::new(root.clone());
    store
        .ensure_tree("AKIAEXAMPLE", &[region.to_owned()])
        .unwrap_or_else(|err| panic!("ensure: {err}"));
    let dir = store.data_dir("AKIAEXAMPLE", region, DataKind::Instances);
    for timestamp in timestamps {
        ResultsStore::write_snapshot(&dir, *timestamp, &[sample_instance()])
            .unwrap_or_else(|err| panic!("write {timestamp}: {err}"));
    }
}

#[rstest]
fn config_rejects_blank_results_dir() {
    let err = JanitorConfig::new("  ").expect_err("blank path should be rejected");
    assert!(
        matches!(err, JanitorError::InvalidConfig { ref field } if field == "results_dir"),
        "unexpected: {err}"
    );
}

#[rstest]
fn prepare_is_idempotent() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = results_root(&tmp);
    let janitor = janitor_for(&root);
    let regions = vec![String::from("us-east-1")];

    janitor
        .prepare("AKIAEXAMPLE", &regions)
        .unwrap_or_else(|err| panic!("first prepare: {err}"));
    janitor
        .prepare("AKIAEXAMPLE", &regions)
        .unwrap_or_else(|err| panic!("second prepare: {err}"));

    assert!(root.join("AKIAEXAMPLE/us-east-1/instances").is_dir());
    assert!(root.join("AKIAEXAMPLE/us-east-1/volumes").is_dir());
}

#[rstest]
fn sweep_keeps_only_newest_snapshot() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = results_root(&tmp);
    seed_snapshots(&root, "us-east-1", &[100, 200, 300]);
    let dir = root.join("AKIAEXAMPLE/us-east-1/instances");
    std::fs::write(dir.join("notes.txt"), "keep me")
        .unwrap_or_else(|err| panic!("write junk: {err}"));

    let summary = janitor_for(&root)
        .sweep()
        .unwrap_or_else(|err| panic!("sweep: {err}"));

    assert_eq!(
        summary,
        SweepSummary {
            deleted_files: 2,
            retained_files: 1
        }
    );
    assert!(dir.join("300.json").is_file());
    assert!(!dir.join("100.json").exists());
    assert!(!dir.join("200.json").exists());
    assert!(dir.join("notes.txt").is_file(), "junk files are left alone");
}

#[rstest]
fn second_sweep_deletes_nothing() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = results_root(&tmp);
    seed_snapshots(&root, "us-east-1", &[100, 200]);
    let janitor = janitor_for(&root);

    janitor.sweep().unwrap_or_else(|err| panic!("first sweep: {err}"));
    let second = janitor
        .sweep()
        .unwrap_or_else(|err| panic!("second sweep: {err}"));

    assert_eq!(second.deleted_files, 0);
    assert_eq!(second.retained_files, 1);
}

#[rstest]
fn sweep_counts_across_multiple_regions() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = results_root(&tmp);
    seed_snapshots(&root, "us-east-1", &[10, 20]);
    seed_snapshots(&root, "eu-west-1", &[30]);

    let summary = janitor_for(&root)
        .sweep()
        .unwrap_or_else(|err| panic!("sweep: {err}"));

    assert_eq!(summary.deleted_files, 1);
    assert_eq!(summary.retained_files, 2);
}

#[rstest]
fn sweep_fails_on_missing_results_dir() {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = results_root(&tmp);

    let Err(err) = janitor_for(&root).sweep() else {
        panic!("sweep of a missing tree should fail");
    };
    assert!(matches!(err, JanitorError::Io { .. }), "unexpected: {err}");
}
