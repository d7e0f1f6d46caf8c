//! End-to-end CLI behaviour: usage errors, exit codes, flag dispatch.
//! Grounded in `original_source/main.cpp`'s `argc`/`argv` handling,
//! run against the built `pascalc` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn pascalc() -> Command {
    Command::cargo_bin("pascalc").unwrap()
}

#[test]
fn no_arguments_prints_usage_and_exits_zero() {
    pascalc()
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: pascalc"));
}

#[test]
fn help_flag_alone_exits_zero() {
    pascalc()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: pascalc"));
}

#[test]
fn flag_with_no_file_reports_no_files_specified() {
    for flag in ["-l", "-s", "-t", "-b"] {
        pascalc()
            .arg(flag)
            .assert()
            .failure()
            .stdout(predicate::str::contains("no files specified"));
    }
}

#[test]
fn unrecognized_flag_letter_reports_unknown_option() {
    pascalc()
        .arg("-x")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown option"));
}

#[test]
fn malformed_flag_shape_reports_invalid_option() {
    pascalc()
        .args(["-xy", "whatever.pas"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid option"));
}

#[test]
fn too_many_arguments_is_rejected() {
    pascalc()
        .args(["-l", "a.pas", "b.pas"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("too many parameters"));
}

#[test]
fn missing_source_file_reports_cannot_open() {
    pascalc()
        .args(["-l", "/nonexistent/path/does_not_exist.pas"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("can't open file"));
}

#[test]
fn lex_only_dump_lists_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("min.pas");
    std::fs::write(&path, "program p;\nbegin\nend.\n").unwrap();

    pascalc()
        .args(["-l", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ReservedWord"))
        .stdout(predicate::str::contains("Eof"));
}

#[test]
fn compile_with_no_flag_emits_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("min.pas");
    std::fs::write(&path, "program p;\nbegin\nend.\n").unwrap();

    pascalc()
        .arg(path.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains(".globl main"))
        .stdout(predicate::str::contains("main:"));
}

#[test]
fn parse_error_is_reported_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.pas");
    std::fs::write(&path, "program p;\nbegin\n  1 + ;\nend.\n").unwrap();

    pascalc()
        .args(["-s", path.to_str().unwrap()])
        .assert()
        .failure();
}
