use assert_cmd::Command;
use predicates::prelude::*;

fn invoicemail() -> Command {
    let mut cmd = Command::cargo_bin("invoicemail").unwrap();
    cmd.env_remove("INVOICEMAIL_PASSWORD");
    cmd
}

#[test]
fn config_path_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    invoicemail()
        .args(["--config", path.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn config_init_then_get_and_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    invoicemail()
        .args(["--config", path, "config", "init"])
        .assert()
        .success();

    invoicemail()
        .args(["--config", path, "config", "get", "polling.interval_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("30"));

    invoicemail()
        .args(["--config", path, "config", "set", "mailbox.provider", "gmail"])
        .assert()
        .success();

    invoicemail()
        .args(["--config", path, "config", "get", "mailbox.provider"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gmail\""));

    invoicemail()
        .args(["--config", path, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn config_set_keeps_numeric_username_as_string() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let path = path.to_str().unwrap();

    invoicemail()
        .args(["--config", path, "config", "set", "mailbox.username", "12345678"])
        .assert()
        .success();

    invoicemail()
        .args(["--config", path, "config", "get", "mailbox.username"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"12345678\""));

    invoicemail()
        .args(["--config", path, "config", "set", "polling.interval_secs", "45"])
        .assert()
        .success();

    invoicemail()
        .args(["--config", path, "config", "get", "polling.interval_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("45").and(predicate::str::contains("\"45\"").not()));
}

#[test]
fn config_refuses_to_store_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    invoicemail()
        .args(["--config", path.to_str().unwrap(), "config", "set", "mailbox.password", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not stored"));
    assert!(!path.exists());
}

#[test]
fn scan_empty_folder() {
    let dir = tempfile::tempdir().unwrap();

    invoicemail()
        .args(["scan", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No PDF files found"));
}

#[test]
fn scan_accepts_labeled_only() {
    let dir = tempfile::tempdir().unwrap();

    invoicemail()
        .args(["scan", "--labeled-only", "--format", "json", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn scan_missing_folder_fails() {
    let dir = tempfile::tempdir().unwrap();

    invoicemail()
        .args(["scan", dir.path().join("missing").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Folder not found"));
}

#[test]
fn merge_without_pdfs_fails() {
    let dir = tempfile::tempdir().unwrap();

    invoicemail()
        .args(["merge", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PDF files found"));
}

#[test]
fn fetch_requires_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    invoicemail()
        .args(["--config", path.to_str().unwrap(), "config", "init"])
        .assert()
        .success();

    invoicemail()
        .args([
            "--config",
            path.to_str().unwrap(),
            "fetch",
            "--provider",
            "ionos",
            "--username",
            "office@example.com",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No password"));
}

#[test]
fn unknown_provider_is_rejected() {
    invoicemail()
        .args(["fetch", "--provider", "aol", "--username", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider"));
}
