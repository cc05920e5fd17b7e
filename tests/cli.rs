// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

// Runs the fpga-intent binary against pipelines written to a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const VALID: &str = r#"
name: cli_demo
stages:
  - id: src
    kind: source
    ports: { out: { direction: output, dtype: bits, width: 12 } }
  - id: dst
    kind: sink
    ports: { in: { direction: input, dtype: bits, width: 12 } }
connections:
  - { from: src.out, to: dst.in }
"#;

const INVALID: &str = r#"
name: cli_broken
stages:
  - { id: a, kind: source }
  - { id: a, kind: sink }
connections:
  - { from: a.out, to: ghost.in }
"#;

fn workspace(content: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pipeline.yaml"), content).unwrap();
    dir
}

fn fpga_intent(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fpga-intent").unwrap();
    cmd.current_dir(dir)
        .env_remove("FPGA_INTENT_PIPELINE")
        .env_remove("FPGA_INTENT_MAX_BYTES")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn validate_accepts_valid_pipeline() {
    let dir = workspace(VALID);

    fpga_intent(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline is valid!"));
}

#[test]
fn validate_reports_every_error() {
    let dir = workspace(INVALID);

    fpga_intent(dir.path())
        .args(["validate", "pipeline.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DuplicateStageId at stages[1].id"))
        .stderr(predicate::str::contains("UnknownStageOrPort at connections[0].to"));
}

#[test]
fn validate_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    fpga_intent(dir.path())
        .args(["validate", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pipeline file not found"));
}

#[test]
fn validate_enforces_size_limit() {
    let dir = workspace(VALID);

    fpga_intent(dir.path())
        .args(["validate", "--max-bytes", "10"])
        .assert()
        .failure();
}

#[test]
fn compile_writes_json_ir() {
    let dir = workspace(VALID);

    fpga_intent(dir.path())
        .args(["compile", "-p", "pipeline.yaml", "-o", "ir.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Parsed IR successfully"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("ir.json")).unwrap())
            .unwrap();
    assert_eq!(json["name"], "cli_demo");
    assert_eq!(json["order"], serde_json::json!(["src", "dst"]));
}

#[test]
fn compile_reports_each_error_once() {
    let dir = workspace(INVALID);

    let output = fpga_intent(dir.path())
        .args(["compile", "-p", "pipeline.yaml", "-o", "ir.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("ir.json").exists());

    // Duplicate `a`, unknown port `a.out`, unknown stage `ghost`
    let stderr = String::from_utf8_lossy(&output.stderr);
    let reported: Vec<_> = stderr.lines().filter(|l| l.trim_start().starts_with('✗')).collect();
    assert_eq!(reported.len(), 3, "{}", stderr);
    assert_eq!(stderr.matches("DuplicateStageId").count(), 1, "{}", stderr);
    assert!(stderr.contains("Compilation failed with 3 error(s)"), "{}", stderr);
}

#[test]
fn graph_reports_each_error_once() {
    let dir = workspace(INVALID);

    let output = fpga_intent(dir.path()).arg("graph").output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("UnknownStageOrPort").count(), 2, "{}", stderr);
}

#[test]
fn graph_renders_mermaid() {
    let dir = workspace(VALID);

    fpga_intent(dir.path())
        .args(["graph", "--format", "mermaid"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph LR"))
        .stdout(predicate::str::contains("src -->|out:in| dst"));
}

#[test]
fn init_then_validate() {
    let dir = tempfile::tempdir().unwrap();

    fpga_intent(dir.path())
        .args(["init", "acc", "--template", "feedback"])
        .assert()
        .success();

    fpga_intent(dir.path())
        .arg("validate")
        .assert()
        .success();

    // A second init must not clobber the file
    fpga_intent(dir.path()).arg("init").assert().failure();
}

#[test]
fn init_quotes_the_pipeline_name() {
    let dir = tempfile::tempdir().unwrap();

    fpga_intent(dir.path())
        .args(["init", r#"x"y\z"#])
        .assert()
        .success();

    fpga_intent(dir.path())
        .args(["compile", "-o", "ir.json"])
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("ir.json")).unwrap())
            .unwrap();
    assert_eq!(json["name"], r#"x"y\z"#);
}
