//! Tests for `pwdstore ls`.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_ls_sorted_and_skips_hidden() {
    let t = Test::with_marker(UNKNOWN_KEY_ID);
    t.write_entry("web/github", b"x");
    t.write_entry("email", b"x");
    t.write_entry(".git/objects/junk", b"x");
    std::fs::write(t.store_path().join("README"), "not an entry").unwrap();

    let output = t.ls(&[]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("2 entries"));
    let email = out.find("email").unwrap();
    let github = out.find("web/github").unwrap();
    assert!(email < github);
    assert!(!out.contains("junk"));
    assert!(!out.contains("README"));
}

#[test]
fn test_ls_subdir() {
    let t = Test::new();
    t.write_entry("web/github", b"x");
    t.write_entry("bank/checking", b"x");

    t.cmd()
        .args(["ls", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web/github").and(predicate::str::contains("bank").not()));
}

#[test]
fn test_ls_json() {
    let t = Test::new();
    t.write_entry("a", b"x");
    t.write_entry("b/c", b"x");

    let output = t.ls(&["--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["count"], 2);
    assert_eq!(value["entries"][0], "a");
    assert_eq!(value["entries"][1], "b/c");
}

#[test]
fn test_ls_empty_store() {
    let t = Test::new();

    t.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("no entries"));
}

#[test]
fn test_ls_rejects_parent_escape() {
    let t = Test::new();

    t.cmd()
        .args(["ls", "../elsewhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid entry name"));
}
