//! Runs the `confmerge` binary.

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn confmerge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_confmerge"))
}

#[test]
fn test_merge_prints_json() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"host": "a", "tags": ["x"]}"#);
    let b = write(&dir, "b.toml", "host = \"b\"\ntags = [\"y\"]\n");

    let output = confmerge()
        .arg("merge")
        .arg(&a)
        .arg(&b)
        .args(["--rule", "tags=append"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value, serde_json::json!({"host": "b", "tags": ["x", "y"]}));
}

#[test]
fn test_merge_failure_exits_with_report() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", r#"{"host": "a"}"#);
    let b = write(&dir, "b.json", r#"{"host": "b"}"#);

    let output = confmerge()
        .arg("merge")
        .arg(&a)
        .arg(&b)
        .args(["--strategy", "raise_on_conflict", "--name", "Site"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Site merge conflicts (1)"), "{stderr}");
    assert!(stderr.contains("  [host]  Conflicting values in multiple sources"), "{stderr}");
}

#[test]
fn test_merge_report() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yaml", "host: a\nport: 1\n");
    let b = write(&dir, "b.yaml", "host: b\n");

    let output = confmerge().arg("merge").arg(&a).arg(&b).arg("--report").output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["fields"]["host"], serde_json::json!([1]));
    assert_eq!(report["fields"]["port"], serde_json::json!([0]));
    assert_eq!(report["strategy"], "last_wins");
}

#[test]
fn test_locate() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", "{\n  \"db\": {\n    \"port\": 1\n  }\n}\n");

    let output = confmerge().arg("locate").arg(&a).arg("db").output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "line 2-4\n\"db\": {\n  \"port\": 1\n}\n"
    );

    let output = confmerge().arg("locate").arg(&a).arg("db.host").output().unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "not found\n");
}
