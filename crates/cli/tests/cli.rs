//! End-to-end tests for the lockstep binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn captures_inline_patterns_from_stdin() {
    Command::cargo_bin("lockstep")
        .unwrap()
        .args([
            "-e",
            r"Total (?P<total>\d+) routes, of which (?P<started>\d+) are started",
            "-e",
            r"Camel (?P<version>\d+\.\d+\.\d+) started",
            "--timeout-secs",
            "10",
        ])
        .write_stdin(
            "noise\n\
             Total 10 routes, of which 10 are started\n\
             more noise\n\
             Camel 3.14.0 started\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total": "10""#))
        .stdout(predicate::str::contains(r#""started": "10""#))
        .stdout(predicate::str::contains(r#""version": "3.14.0""#));
}

#[test]
fn plain_format_prints_name_value_lines() {
    Command::cargo_bin("lockstep")
        .unwrap()
        .args(["-e", r"ready (?P<port>\d+)", "--format", "plain", "--timeout-secs", "10"])
        .write_stdin("ready 8080\n")
        .assert()
        .success()
        .stdout("port=8080\n");
}

#[test]
fn exits_one_when_stream_ends_early() {
    Command::cargo_bin("lockstep")
        .unwrap()
        .args(["-e", "never appears", "--timeout-secs", "10"])
        .write_stdin("nothing useful\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("closed"));
}

#[test]
fn reports_partial_groups_on_failure() {
    Command::cargo_bin("lockstep")
        .unwrap()
        .args([
            "-e",
            r"first (?P<a>\d+)",
            "-e",
            "never appears",
            "--timeout-secs",
            "10",
        ])
        .write_stdin("first 1\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("a=1"));
}

#[test]
fn exits_two_without_patterns_or_spec() {
    Command::cargo_bin("lockstep")
        .unwrap()
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no patterns given"));
}

#[test]
fn exits_two_on_invalid_pattern() {
    Command::cargo_bin("lockstep")
        .unwrap()
        .args(["-e", "(?P<broken>"])
        .assert()
        .code(2);
}

#[test]
fn runs_from_a_spec_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.yaml");
    std::fs::write(
        &path,
        r"
name: startup
timeout_ms: 10000
patterns:
  - pattern: 'listening on (?P<port>\d+)'
    label: listen-line
",
    )
    .unwrap();

    Command::cargo_bin("lockstep")
        .unwrap()
        .args(["--spec", path.to_str().unwrap()])
        .write_stdin("booting\nlistening on 9000\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""port": "9000""#));
}
