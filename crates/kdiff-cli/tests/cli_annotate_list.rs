use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel)
}

fn kdiff() -> Command {
    let mut cmd = cargo_bin_cmd!("kdiff");
    cmd.env_remove("GITHUB_ACTIONS").env_remove("KDIFF_RULES");
    cmd
}

#[test]
fn annotate_defaults_marks_default_values_and_drops_nulls() {
    let tmp = tempfile::tempdir().unwrap();

    kdiff()
        .arg("annotate-defaults")
        .arg("--input-dir")
        .arg(fixture("config"))
        .arg("--output-dir")
        .arg(tmp.path())
        .arg("--defaults-file")
        .arg(fixture("defaults/defaults.yaml"))
        .assert()
        .success();

    let out = std::fs::read_to_string(tmp.path().join("mimir.yaml")).unwrap();
    assert!(out.contains("http_listen_port: 8080 (default)"), "{out}");
    assert!(out.contains("log_level: debug"), "{out}");
    assert!(out.contains("max_series: 150000 (default)"), "{out}");
    assert!(!out.contains("ingestion_rate"), "{out}");
}

#[test]
fn annotate_defaults_needs_a_defaults_source() {
    let tmp = tempfile::tempdir().unwrap();

    kdiff()
        .arg("annotate-defaults")
        .arg("--input-dir")
        .arg(fixture("config"))
        .arg("--output-dir")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--defaults-file or --image"));
}

#[test]
fn annotate_defaults_reports_a_missing_runtime() {
    let tmp = tempfile::tempdir().unwrap();

    kdiff()
        .arg("annotate-defaults")
        .arg("--input-dir")
        .arg(fixture("config"))
        .arg("--output-dir")
        .arg(tmp.path())
        .args(["--image", "grafana/mimir", "--runtime", "kdiff-no-such-runtime"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load defaults"))
        .stderr(predicate::str::contains("grafana/mimir:latest"));
}

#[test]
fn list_rules_prints_the_desugared_table() {
    kdiff()
        .arg("list-rules")
        .arg("--rules")
        .arg(fixture("rules/effective.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^index\s+kind\s+name\s+match\s+patch\s+todo$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^0\s+ignore\s+Drop services\s+1\s+0\s+no$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^2\s+patch\s+Relabel to loki\s+1\s+1\s+yes$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^3\s+patch\s+Remove /spec/replicas\s+1\s+1\s+no$").unwrap());
}
