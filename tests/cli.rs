//! Command line behaviour of the `shipwright` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn shipwright() -> Command {
    let mut cmd = Command::cargo_bin("shipwright").expect("binary built");
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env_remove("SHIPWRIGHT_TAG");
    cmd
}

#[test]
fn check_accepts_valid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("shipwright.toml");
    fs::write(
        &config,
        "project_name = \"widgets\"\n\n[release.github]\nowner = \"acme\"\nname = \"widgets\"\n",
    )
    .expect("write config");

    shipwright()
        .arg("check")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("configuration OK"))
        .stdout(predicate::str::contains("release"));
}

#[test]
fn check_rejects_config_without_repository() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("shipwright.toml");
    fs::write(&config, "project_name = \"widgets\"\n").expect("write config");

    shipwright()
        .args(["check", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("release: failed to set defaults"));
}

#[test]
fn check_reports_invalid_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("shipwright.toml");
    fs::write(&config, "[release\nowner = ").expect("write config");

    shipwright()
        .args(["check", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command 'check' failed"));
}

#[test]
fn check_reports_missing_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");

    shipwright()
        .args(["check", "--config"])
        .arg(dir.path().join("missing.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn release_requires_a_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("shipwright.toml");
    fs::write(
        &config,
        "[release.github]\nowner = \"acme\"\nname = \"widgets\"\n",
    )
    .expect("write config");

    shipwright()
        .args(["release", "--tag", "v1.0.0", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn release_rejects_identical_tags() {
    shipwright()
        .args(["release", "--tag", "v1.0.0", "--previous-tag", "v1.0.0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--previous-tag"));
}

#[test]
fn release_requires_a_tag() {
    shipwright().arg("release").assert().failure();
}
