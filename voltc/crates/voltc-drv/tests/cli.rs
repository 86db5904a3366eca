//! CLI-level tests for the `voltc` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn voltc() -> Command {
    Command::cargo_bin("voltc").unwrap()
}

#[test]
fn test_no_arguments_fails() {
    voltc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage: voltc"));
}

#[test]
fn test_missing_separator_fails() {
    voltc()
        .arg("main.vlt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing '-o' separator"));
}

#[test]
fn test_unbalanced_inputs_outputs_fails() {
    voltc()
        .args(["a.vlt", "b.vlt", "-o", "a.o"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "2 input file(s) but 1 output file(s)",
        ));
}

#[test]
fn test_valid_program_compiles() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("main.vlt");
    std::fs::write(&input, "fn main() -> i32 { return 0; }").unwrap();

    voltc()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("main.o"))
        .assert()
        .success();
}

#[test]
fn test_semantic_error_renders_location() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("main.vlt");
    std::fs::write(&input, "fn f() -> i32 { return q; }").unwrap();

    voltc()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("main.o"))
        .env("NO_COLOR", "1")
        .assert()
        .failure()
        .stderr(predicate::str::contains(":1:24: Undefined symbol 'q'"))
        .stderr(predicate::str::contains("error: semantic analysis failed"));
}

#[test]
fn test_missing_input_file_fails() {
    voltc()
        .args(["definitely_missing.vlt", "-o", "out.o"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
