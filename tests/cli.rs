//! Binary-level tests for the exit-code contract.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn run_without_config_exits_with_user_error_code() {
    let data = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("sharepoint-transfer").expect("Binary exists");
    cmd.arg("run").arg("--data-dir").arg(data.path());

    // Missing config.json is a user-facing configuration error: exit code 1.
    cmd.assert().failure().code(1);
}

#[test]
fn run_with_invalid_operation_type_exits_with_user_error_code() {
    let data = tempdir().unwrap();
    fs::write(
        data.path().join("config.json"),
        r##"{
            "sharepoint": {
                "client_id": "c", "#client_secret": "s", "tenant_id": "t",
                "username": "u@example.com", "#password": "p",
                "authority": "https://login.microsoftonline.com"
            },
            "o365": {
                "client_id": "c", "#client_secret": "s", "tenant_id": "t",
                "hostname": "example.sharepoint.com", "url": "/sites/analytics"
            },
            "main_folder_path": "/base",
            "operation_type": "sync"
        }"##,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("sharepoint-transfer").expect("Binary exists");
    cmd.arg("run").arg("--data-dir").arg(data.path());

    // Rejected during validation, before any network call: exit code 1.
    cmd.assert().failure().code(1);
}

#[test]
fn help_describes_the_run_subcommand() {
    let mut cmd = Command::cargo_bin("sharepoint-transfer").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("run"));
}
