// tests/discovery_tests.rs
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Cursor;

use fortipick::{discover, InputSource, Rewind, DEFAULT_SAMPLE_SIZE};

const SCENARIO: &str = "srcip=1.2.3.4,dstip=5.6.7.8\nsrcip=9.9.9.9,action=deny\n";

#[test]
fn test_list_fields_in_first_seen_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("fw.log");
    fs::write(&log, SCENARIO).unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .arg("--list-fields")
        .arg(&log)
        .assert()
        .success()
        .stdout("srcip\ndstip\naction\n");
}

#[test]
fn test_list_fields_uses_first_pattern_only() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.log");
    let second = dir.path().join("second.log");
    fs::write(&first, "a=1\n").unwrap();
    fs::write(&second, "b=2\n").unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .arg("--list-fields")
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout("a\n");
}

#[test]
fn test_list_fields_respects_sample_size() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("fw.log");
    fs::write(&log, SCENARIO).unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .args(["--list-fields", "--sample", "1"])
        .arg(&log)
        .assert()
        .success()
        .stdout("srcip\ndstip\n");
}

#[test]
fn test_list_fields_output_works_as_field_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("fw.log");
    fs::write(&log, SCENARIO).unwrap();

    let listed = Command::cargo_bin("fortipick")
        .unwrap()
        .arg("--list-fields")
        .arg(&log)
        .output()
        .unwrap();
    let fields = dir.path().join("fields.txt");
    fs::write(&fields, &listed.stdout).unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .arg("-f")
        .arg(&fields)
        .arg(&log)
        .assert()
        .success()
        .stdout("srcip,dstip,action\n1.2.3.4,5.6.7.8,\n9.9.9.9,,deny\n");
}

#[test]
fn test_first_file_not_found() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .arg(dir.path().join("missing-*.log"))
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("No such file or directory"));
}

#[test]
fn test_no_picker_without_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("fw.log");
    fs::write(&log, SCENARIO).unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .arg(&log)
        .write_stdin("1\n")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("no field selection given"));
}

#[test]
fn test_no_fields_discovered() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("plain.log");
    fs::write(&log, "just,some,text\n").unwrap();

    Command::cargo_bin("fortipick")
        .unwrap()
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no fields found"));
}

#[test]
fn test_discovery_then_full_read_of_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("fw.log");
    fs::write(&log, SCENARIO).unwrap();

    let mut reader = InputSource::from_path(&log).open().unwrap();
    assert!(reader.supports_seek());
    let candidates = discover(&mut reader, "=", DEFAULT_SAMPLE_SIZE).unwrap();
    assert_eq!(candidates.len(), 3);

    let mut content = String::new();
    std::io::Read::read_to_string(&mut reader, &mut content).unwrap();
    assert_eq!(content, SCENARIO);
}

#[test]
fn test_discovery_with_custom_separator() {
    let mut reader = Cursor::new("user:alice,msg:hi,noise\nlevel:warn\n");
    let candidates = discover(&mut reader, ":", DEFAULT_SAMPLE_SIZE).unwrap();
    let names: Vec<_> = candidates.iter().collect();
    assert_eq!(names, vec!["user", "msg", "level"]);
}
