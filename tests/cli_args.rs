//! Integration tests for CLI argument handling
//!
//! Tests the subcategory argument and flag parsing from the command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_duaread"))
        .args(args)
        .output()
        .expect("Failed to execute duaread")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("duaread"), "Help should mention duaread");
    assert!(
        stdout.contains("offline"),
        "Help should mention --offline flag"
    );
    assert!(
        stdout.contains("SUBCATEGORY"),
        "Help should mention the subcategory argument"
    );
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(
        output.status.success(),
        "Expected --version to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("duaread"));
}

#[test]
fn test_invalid_subcategory_prints_error_and_exits() {
    let output = run_cli(&["../etc"]);
    assert!(
        !output.status.success(),
        "Expected a path-like subcategory id to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid subcategory"),
        "Should print error message about the invalid id: {}",
        stderr
    );
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = run_cli(&["--no-such-flag"]);
    assert!(!output.status.success(), "Expected unknown flag to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unexpected") || stderr.contains("error"),
        "clap should report the unknown flag: {}",
        stderr
    );
}
