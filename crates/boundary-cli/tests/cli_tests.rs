//! End-to-end tests for the `boundary` binary
//!
//! Every test runs from an empty temporary directory with HOME pointed at it,
//! so no user or project configuration leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn boundary(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("boundary").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("BOUNDARY_LIBRARY")
        .env_remove("BOUNDARY_DECODE_LOSS");
    cmd
}

// ============================================================================
// Echo
// ============================================================================

#[test]
fn test_echo_string() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["echo-string", "Hello World!"])
        .assert()
        .success()
        .stdout("Hello World!\n");
}

#[test]
fn test_echo_strings_one_per_line() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["echo-strings", "Here", "are", "\u{2764}"])
        .assert()
        .success()
        .stdout("Here\nare\n\u{2764}\n");
}

#[test]
fn test_echo_ints_accepts_negatives() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["echo-ints", "-1", "2", "-3"])
        .assert()
        .success()
        .stdout("-1\n2\n-3\n");
}

#[test]
fn test_echo_floats_single_precision() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["echo-floats", "0.1", "-0.5"])
        .assert()
        .success()
        .stdout("0.1\n-0.5\n");
}

#[test]
fn test_echo_ints_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["echo-ints", "1", "3000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Element 1: number 3000000000 out of range for c_int",
        ));
}

#[test]
fn test_echo_without_arguments_is_empty() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .arg("echo-ints")
        .assert()
        .success()
        .stdout("");
}

// ============================================================================
// Print
// ============================================================================

#[test]
fn test_print_string() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["print-string", "printed"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "print_string() native representation: printed",
        ));
}

#[test]
fn test_print_ints() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["print-ints", "1", "2", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "print_int_array() native representation: [1, 2, 3]",
        ));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_missing_library_flag_fails() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["--library", "/nonexistent/libboundary_native.so", "echo-string", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to bind native library"));
}

#[test]
fn test_library_from_project_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("boundary.toml"),
        "[library]\npath = \"missing/libboundary_native.so\"\n",
    )
    .unwrap();

    // Relative paths resolve against the directory holding boundary.toml
    boundary(&dir)
        .args(["echo-string", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing/libboundary_native.so"));
}

#[test]
fn test_invalid_decode_loss_rejected() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["--decode-loss", "loud", "echo-string", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be 'warn', 'info', 'debug', or 'off'"));
}

#[test]
fn test_count_checking_cannot_be_disabled() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .args(["--no-verify", "echo-ints", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-verify"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    boundary(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("echo-strings"))
        .stdout(predicate::str::contains("print-floats"));
}
