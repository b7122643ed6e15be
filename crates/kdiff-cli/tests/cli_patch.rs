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
    cmd.env_remove("GITHUB_ACTIONS")
        .env_remove("KDIFF_RULES")
        .env_remove("KDIFF_OUTPUT_TEMPLATE")
        .env_remove("RUST_LOG");
    cmd
}

fn patch_cmd(rules: &str, out: &Path) -> Command {
    let mut cmd = kdiff();
    cmd.arg("patch")
        .arg("--rules")
        .arg(fixture(rules))
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(out);
    cmd
}

#[test]
fn effective_rules_rewrite_the_corpus_and_exit_0() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");

    patch_cmd("rules/effective.yaml", &out)
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("Skipped files"))
        .stdout(predicate::str::contains("NOTES.txt"))
        .stdout(predicate::str::contains("Ineffective").not());

    let querier = std::fs::read_to_string(out.join("querier.yaml")).unwrap();
    assert!(querier.contains("app.kubernetes.io/name: loki"), "{querier}");
    assert!(!querier.contains("kind: Service"), "{querier}");
    assert!(!querier.contains("replicas"), "{querier}");

    let ruler = std::fs::read_to_string(out.join("ruler.yaml")).unwrap();
    assert!(ruler.contains("app.kubernetes.io/name: loki"), "{ruler}");
}

#[test]
fn ineffective_rules_are_reported_but_do_not_fail_by_default() {
    let tmp = tempfile::tempdir().unwrap();

    patch_cmd("rules/ineffective.yaml", tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Ineffective rules (2)"))
        .stdout(predicate::str::contains(
            "rule \"Drop gateways\" matching step 0",
        ))
        .stdout(predicate::str::contains(
            "rule \"Keep mimir label\" patching step 0",
        ));
}

#[test]
fn fail_on_ineffective_exits_2_with_json_diagnostics() {
    let tmp = tempfile::tempdir().unwrap();

    patch_cmd("rules/ineffective.yaml", tmp.path())
        .args(["--fail-on-ineffective", "--diagnostics-json"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("\"findings\""))
        .stderr(predicate::str::contains("\"code\":\"ineffective_match\""))
        .stderr(predicate::str::contains("\"code\":\"ineffective_patch\""));
}

#[test]
fn print_todo_shows_original_values() {
    let tmp = tempfile::tempdir().unwrap();

    patch_cmd("rules/effective.yaml", tmp.path())
        .arg("--print-todo")
        .assert()
        .success()
        .stdout(predicate::str::contains("# Relabel to loki"))
        .stdout(predicate::str::contains(
            "querier.yaml: Deployment/default/querier\n```yaml\nmetadata:\n  labels:\n    app.kubernetes.io/name: mimir\n```",
        ));
}

#[test]
fn print_debug_lists_what_each_step_touched() {
    let tmp = tempfile::tempdir().unwrap();

    patch_cmd("rules/effective.yaml", tmp.path())
        .arg("--print-debug")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Rule: Drop services\nMatch step 0: test /kind == \"Service\"\n    querier.yaml: Service/default/querier",
        ))
        .stdout(predicate::str::contains("Rule: Relabel to loki"));
}

#[test]
fn output_template_controls_file_names() {
    let tmp = tempfile::tempdir().unwrap();

    patch_cmd("rules/effective.yaml", tmp.path())
        .args(["--output-template", "{{ kind | lower }}-{{ metadata.name }}.yaml"])
        .assert()
        .success();

    assert!(tmp.path().join("deployment-querier.yaml").is_file());
    assert!(tmp.path().join("deployment-ruler.yaml").is_file());
    assert!(!tmp.path().join("service-querier.yaml").exists());
}

#[test]
fn several_directory_pairs_share_one_validation() {
    let tmp = tempfile::tempdir().unwrap();
    let (a, b) = (tmp.path().join("a"), tmp.path().join("b"));

    kdiff()
        .arg("patch")
        .arg("--rules")
        .arg(fixture("rules/effective.yaml"))
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(&a)
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(&b)
        .arg("--fail-on-ineffective")
        .assert()
        .success();

    assert!(a.join("querier.yaml").is_file());
    assert!(b.join("ruler.yaml").is_file());
}

#[test]
fn mismatched_directory_counts_exit_1() {
    let tmp = tempfile::tempdir().unwrap();

    kdiff()
        .arg("patch")
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("same number of times"));
}

#[test]
fn missing_directories_exit_1() {
    kdiff()
        .arg("patch")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--input-dir and --output-dir are required"));
}

#[test]
fn unknown_flag_exits_1() {
    kdiff()
        .args(["patch", "--no-such-flag"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn rules_can_come_from_the_environment() {
    let tmp = tempfile::tempdir().unwrap();

    kdiff()
        .env("KDIFF_RULES", fixture("rules/ineffective.yaml"))
        .arg("patch")
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop gateways"));
}

#[test]
fn rule_paths_may_contain_commas() {
    let tmp = tempfile::tempdir().unwrap();
    let rules = tmp.path().join("mimir,loki.yaml");
    std::fs::copy(fixture("rules/ineffective.yaml"), &rules).unwrap();

    kdiff()
        .arg("patch")
        .arg("--rules")
        .arg(&rules)
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(tmp.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop gateways"));
}

#[test]
fn github_actions_output_uses_collapsible_sections() {
    let tmp = tempfile::tempdir().unwrap();

    patch_cmd("rules/ineffective.yaml", tmp.path())
        .env("GITHUB_ACTIONS", "true")
        .assert()
        .success()
        .stdout(predicate::str::contains("<details>\n<summary>\nIneffective rules (2)\n</summary>"))
        .stdout(predicate::str::contains("* rule \"Drop gateways\" matching step 0:"));
}

#[test]
fn invalid_rule_file_exits_1() {
    let tmp = tempfile::tempdir().unwrap();
    let rules = tmp.path().join("bad.yaml");
    std::fs::write(&rules, "patchRules:\n  - renameObjects: {from: a, to: b}\n").unwrap();

    kdiff()
        .arg("patch")
        .arg("--rules")
        .arg(&rules)
        .arg("--input-dir")
        .arg(fixture("manifests"))
        .arg("--output-dir")
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load rules"));
}
