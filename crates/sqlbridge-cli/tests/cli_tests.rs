//! CLI integration tests for sqlbridge.
//!
//! These tests verify command-line argument parsing, help output,
//! validation diagnostics and exit codes for error conditions that do not
//! need a live data source.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const ENV_VARS: [&str; 12] = [
    "SQLBRIDGE_PREFIX",
    "SQLBRIDGE_DRIVER_PATH",
    "SQLBRIDGE_DRIVER_CLASS",
    "SQLBRIDGE_JDBC_URL",
    "SQLBRIDGE_TABLES",
    "SQLBRIDGE_LOG_FILE",
    "CDATA_PREFIX",
    "CDATA_DRIVER_PATH",
    "CDATA_DRIVER_CLASS",
    "CDATA_JDBC_URL",
    "CDATA_TABLES",
    "CDATA_LOG_FILE",
];

/// Get a command for the sqlbridge binary with a clean environment.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("sqlbridge").unwrap();
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn settings_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("tables"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlbridge"));
}

#[test]
fn test_global_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: warn]"));
}

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Settings Errors
// =============================================================================

#[test]
fn test_missing_settings_file_exits_with_code_7() {
    cmd()
        .args(["--config", "nonexistent_settings_file.yaml", "validate"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_2() {
    let file = settings_file(&["prefix: [unterminated"]);

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "validate"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_setting_exits_with_code_2() {
    let file = settings_file(&["jdbc-url: x"]);

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("jdbc-url"));
}

// =============================================================================
// Validation Diagnostics
// =============================================================================

#[test]
fn test_empty_prefix_reported() {
    let file = settings_file(&[
        "prefix: \"\"",
        "connector-class: acme.Missing",
        "data-source-url: \"DSN=acme\"",
    ]);

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "validate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("The 'prefix' option is missing"))
        .stderr(predicate::str::contains(
            "Attempting to load the bundled connector failed: ClassNotFound",
        ))
        .stderr(predicate::str::contains("Failed to open connection").not());
}

#[test]
fn test_env_overrides_settings_file() {
    let file = settings_file(&[
        "prefix: crm",
        "connector-class: acme.Missing",
        "data-source-url: \"DSN=acme\"",
    ]);

    cmd()
        .env("SQLBRIDGE_PREFIX", "")
        .args(["--config", file.path().to_str().unwrap(), "validate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("The 'prefix' option is missing"));
}

#[test]
fn test_legacy_env_names_still_apply() {
    cmd()
        .env("CDATA_PREFIX", "")
        .env("CDATA_DRIVER_CLASS", "acme.Missing")
        .env("CDATA_JDBC_URL", "DSN=acme")
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("The 'prefix' option is missing"))
        .stderr(predicate::str::contains("ClassNotFound"));
}

#[test]
fn test_missing_external_connector_file() {
    let file = settings_file(&[
        "connector-source: /nonexistent/libacme.so",
        "connector-class: acme",
        "data-source-url: \"DSN=acme\"",
    ]);

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "info"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "The 'connector-source' option is not a valid connector library file",
        ));
}

#[test]
fn test_external_source_requires_class() {
    cmd()
        .env("SQLBRIDGE_DRIVER_PATH", "/nonexistent/libacme.so")
        .env("SQLBRIDGE_JDBC_URL", "DSN=acme")
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("The 'connector-class' option is missing"));
}

#[test]
fn test_missing_data_source_url() {
    cmd()
        .env("SQLBRIDGE_DRIVER_CLASS", "acme.Missing")
        .arg("tables")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("The 'data-source-url' option is missing"));
}

#[test]
fn test_missing_packaged_resource() {
    cmd()
        .env("SQLBRIDGE_DRIVER_PATH", "resource:libdoes-not-exist.so")
        .env("SQLBRIDGE_DRIVER_CLASS", "odbc")
        .env("SQLBRIDGE_JDBC_URL", "DSN=acme")
        .arg("validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "resource not found: libdoes-not-exist.so",
        ));
}

// =============================================================================
// Logging
// =============================================================================

#[test]
fn test_log_file_receives_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("sqlbridge.log");

    cmd()
        .env("SQLBRIDGE_LOG_FILE", log_path.to_str().unwrap())
        .env("SQLBRIDGE_DRIVER_CLASS", "acme.Missing")
        .arg("validate")
        .assert()
        .code(1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("The 'data-source-url' option is missing"));
}
