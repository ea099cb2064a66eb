//! CLI smoke tests. Processing real documents needs the external
//! tesseract/pdftoppm binaries, so these stick to argument handling.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let db_path = dir.path().join("invoices.db");
    let config_path = dir.path().join("config.json");
    let config = format!(
        r#"{{"store": {{"db_path": {:?}}}}}"#,
        db_path.to_str().unwrap()
    );
    std::fs::write(&config_path, config).unwrap();
    config_path
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("factura")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn config_init_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("factura.json");

    Command::cargo_bin("factura")
        .unwrap()
        .args(["config", "init", path.to_str().unwrap()])
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("render_dpi"));
    assert!(content.contains("default_currency"));
}

#[test]
fn process_rejects_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    Command::cargo_bin("factura")
        .unwrap()
        .args(["--config", config.to_str().unwrap()])
        .args(["process", dir.path().join("absent.png").to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn batch_rejects_empty_glob() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir);

    Command::cargo_bin("factura")
        .unwrap()
        .args(["--config", config.to_str().unwrap()])
        .args(["batch", dir.path().join("*.png").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}
