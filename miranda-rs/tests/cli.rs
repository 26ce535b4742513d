//! CLI integration tests
//!
//! Every test writes a synthetic profile into a temporary directory and runs
//! the real binary against it.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use miranda_db::EventFlags;
use miranda_db::test_utils::{DatabaseBuilder, EventSpec, SettingsBlob};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn miranda() -> Command {
    let mut cmd = Command::cargo_bin("miranda-rs").unwrap();
    cmd.env("TZ", "UTC").env_remove("MIRANDA_UTF_MODE");
    cmd
}

/// Two contacts and an owner record
fn write_profile(dir: &TempDir) -> PathBuf {
    let mut builder = DatabaseBuilder::new();
    builder
        .owner()
        .settings(SettingsBlob::new().ascii("Nick", "me"));
    builder
        .contact()
        .settings(
            SettingsBlob::new()
                .dword("UIN", 123_456)
                .ascii("Nick", "Bob")
                .byte("Status", 1),
        )
        .event(EventSpec::message("hi").timestamp(1_000))
        .event(
            EventSpec::message("hello Bob")
                .timestamp(2_000)
                .flags(EventFlags::SENT),
        );
    builder
        .contact()
        .settings(
            SettingsBlob::new()
                .dword("UIN", 777)
                .ascii("FirstName", "Ann")
                .ascii("LastName", "Lee"),
        )
        .event(EventSpec::utf8_message("grüße").timestamp(3_000));

    let path = dir.path().join("profile.dat");
    std::fs::write(&path, builder.build()).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help() {
    miranda()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("--utf-mode"));
}

#[test]
fn test_info() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    miranda()
        .args(["info", arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contacts: 2"))
        .stdout(predicate::str::contains("(valid)"))
        .stdout(predicate::str::contains("Owner: me"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    miranda()
        .args(["info", arg(&dir.path().join("nope.dat"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open database"));
}

#[test]
fn test_truncated_header_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.dat");
    std::fs::write(&path, [0u8; 20]).unwrap();

    miranda()
        .args(["info", arg(&path)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Truncated header"));
}

#[test]
fn test_names() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    miranda()
        .args(["names", arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("123456"))
        .stdout(predicate::str::contains("Bob"))
        .stdout(predicate::str::contains("Ann"))
        .stdout(predicate::str::contains("Lee"));
}

#[test]
fn test_find() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    miranda()
        .args(["find", arg(&profile), "UIN", "777"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact: Ann Lee"))
        .stdout(predicate::str::contains("Event count: 1"))
        .stdout(predicate::str::contains("Bob").not());

    miranda()
        .args(["find", arg(&profile), "Nick", "Nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No contact with Nick = Nobody"));
}

#[test]
fn test_contacts() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    miranda()
        .args(["contacts", arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact: Bob"))
        .stdout(predicate::str::contains("Contact: Ann Lee"))
        .stdout(predicate::str::contains("Event count: 2"));
}

#[test]
fn test_events() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    let output = miranda()
        .args(["events", arg(&profile)])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(
        lines,
        vec![
            "< Bob (1970-01-01 00:16:40) Message: hi",
            "> Bob (1970-01-01 00:33:20) Message: hello Bob",
            "< Ann Lee (1970-01-01 00:50:00) Message: grüße",
        ]
    );
}

#[test]
fn test_events_utf16_mode_from_env() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    // "grüße" has an odd UTF-8 length, so UTF-16 decoding warns
    miranda()
        .env("MIRANDA_UTF_MODE", "utf16")
        .args(["events", arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message: grüße").not())
        .stderr(predicate::str::contains("not valid"));

    miranda()
        .env("MIRANDA_UTF_MODE", "utf16")
        .args(["events", arg(&profile), "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_events_with_mmap() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);

    miranda()
        .args(["events", "--mmap", arg(&profile)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message: hello Bob"));
}

#[test]
fn test_export_sqlite() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);
    let output = dir.path().join("out.db3");

    miranda()
        .args(["export", arg(&profile), "-o", arg(&output)])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Exported 2 contacts, 6 settings and 3 events",
        ));

    let conn = rusqlite::Connection::open(&output).unwrap();
    let names: Vec<String> = conn
        .prepare("SELECT name FROM contacts ORDER BY id")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(names, vec!["Bob".to_string(), "Ann Lee".to_string()]);

    let direction: String = conn
        .query_row(
            "SELECT direction FROM events WHERE data = 'hello Bob'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(direction, ">");
}

#[test]
fn test_export_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);
    let output = dir.path().join("out.db3");
    std::fs::write(&output, b"keep me").unwrap();

    miranda()
        .args(["export", arg(&profile), "-o", arg(&output)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");

    miranda()
        .args(["export", arg(&profile), "-o", arg(&output), "--force"])
        .assert()
        .success();
    assert_ne!(std::fs::read(&output).unwrap(), b"keep me");
}

#[test]
fn test_export_json() {
    let dir = TempDir::new().unwrap();
    let profile = write_profile(&dir);
    let output = dir.path().join("out.json");

    miranda()
        .args(["export", arg(&profile), "-o", arg(&output), "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 contacts"));

    let text = std::fs::read_to_string(&output).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["header"]["contact_count"], 2);
    assert_eq!(json["contacts"][0]["display_name"], "Bob");
    assert_eq!(
        json["contacts"][0]["settings"]["UIN"],
        serde_json::json!({ "type": "Dword", "value": 123_456 })
    );
    assert_eq!(json["contacts"][1]["events"][0]["text"], "grüße");
}

#[test]
fn test_completions() {
    miranda()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("miranda-rs"));
}
