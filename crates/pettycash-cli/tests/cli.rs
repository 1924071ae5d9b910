use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const VOUCHER: &str = "PETTY CASH VOUCHER
Voucher No [ 1042 ]      Date   12/03/2025
Claim By  Ali Khan  Department Operations  Station KHI
Staff No 55210   Cost Center CC200
Book  300  00
Pen  100  00
Pins   50  00
TOTAL 500
Amount in words: Four Hundred Fifty Only
5100 200 | 1000 500 500 450 00
Accounting Allocation Only
5100 200 |123 45 67 450 00 99 Office supplies
Approved By  S. Ahmed
Received Cash 450
";

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        Self::with_ocr(serde_json::Value::Null)
    }

    fn with_ocr(command: serde_json::Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        let json = serde_json::json!({
            "ocr": { "command": command, "timeout_secs": 10 },
            "storage": { "database_path": dir.path().join("vouchers.db") },
        });
        fs::write(&config, serde_json::to_string_pretty(&json).unwrap()).unwrap();
        Self { dir, config }
    }

    fn file(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("pettycash").unwrap();
        cmd.arg("--config").arg(&self.config);
        cmd
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[test]
fn test_extract_text_file_prints_json() {
    let ws = Workspace::new();
    let input = ws.file("voucher.txt", VOUCHER);

    let output = ws.cmd().arg("extract").arg(&input).output().unwrap();
    assert!(output.status.success());

    let voucher: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(voucher["voucher_no"], "1042");
    assert_eq!(voucher["paid_to"], "Ali Khan");
    assert_eq!(voucher["total_amount"], "450.00");
    assert_eq!(voucher["line_items"].as_array().unwrap().len(), 3);
    assert_eq!(voucher["allocations"][0]["description"], "Office supplies");
    assert!(voucher.get("id").is_none());
}

#[test]
fn test_extract_reports_warnings() {
    let ws = Workspace::new();
    let input = ws.file("voucher.txt", "Book 300 00");

    ws.cmd()
        .args(["extract", "--warnings", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 300.00"))
        .stderr(predicate::str::contains("Could not extract paid_to"));
}

#[test]
fn test_extract_missing_input() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["extract", "nope.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_ingest_then_list_and_show() {
    let ws = Workspace::new();
    let input = ws.file("voucher.txt", VOUCHER);

    ws.cmd()
        .arg("ingest")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved voucher 1"));

    ws.cmd()
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1,1042,12/03/2025,Ali Khan"));

    let output = ws.cmd().args(["show", "1"]).output().unwrap();
    assert!(output.status.success());
    let voucher: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(voucher["id"], 1);
    assert_eq!(voucher["budget_rows"][0]["budget"], 1000);
}

#[test]
fn test_edit_and_save_replaces_voucher() {
    let ws = Workspace::new();
    let input = ws.file("voucher.txt", VOUCHER);
    ws.cmd().arg("ingest").arg(&input).assert().success();

    let output = ws.cmd().args(["show", "1"]).output().unwrap();
    let mut voucher: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    voucher["paid_to"] = "Sara Malik".into();
    voucher["line_items"] = serde_json::json!([{ "details": "Taxi", "amount": "75.00" }]);
    voucher["total_amount"] = "999".into();
    let edited = ws.file("edited.json", serde_json::to_string(&voucher).unwrap());

    ws.cmd()
        .arg("save")
        .arg(&edited)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved voucher 1"));

    let output = ws.cmd().args(["show", "1"]).output().unwrap();
    let stored: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stored["paid_to"], "Sara Malik");
    assert_eq!(stored["total_amount"], "75.00");
    assert_eq!(stored["line_items"].as_array().unwrap().len(), 1);

    ws.cmd()
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sara Malik").and(predicate::str::contains("Ali Khan").not()));
}

#[test]
fn test_save_rejects_incomplete_allocation() {
    let ws = Workspace::new();
    let edited = ws.file(
        "bad.json",
        r#"{"voucher_no": "7", "allocations": [{"account": "5100"}]}"#,
    );

    ws.cmd()
        .arg("save")
        .arg(&edited)
        .assert()
        .failure()
        .stderr(predicate::str::contains("allocation row 0 is missing"));

    ws.cmd()
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_show_unknown_voucher() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Voucher 42 not found"));
}

#[test]
fn test_database_flag_overrides_config() {
    let ws = Workspace::new();
    let input = ws.file("voucher.txt", VOUCHER);
    let other = ws.path().join("other.db");

    ws.cmd()
        .arg("--database")
        .arg(&other)
        .arg("ingest")
        .arg(&input)
        .assert()
        .success();

    assert!(other.exists());
    ws.cmd()
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1042").not());
}

#[test]
fn test_batch_text_files() {
    let ws = Workspace::new();
    ws.file("a.txt", VOUCHER);
    ws.file("b.txt", "Voucher No [ 2001 ]\nTaxi 90 00");
    ws.file("notes.md", "ignored");
    let summary = ws.path().join("summary.csv");

    ws.cmd()
        .arg("batch")
        .arg(format!("{}/*", ws.path().display()))
        .arg("--summary")
        .arg(&summary)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 0 failed"));

    let csv = fs::read_to_string(&summary).unwrap();
    assert!(csv.contains("a.txt,success,1,1042,450.00"));
    assert!(csv.contains("b.txt,success,2,2001,90.00"));
}

#[test]
fn test_config_get_and_set() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "get", "extraction.allocation_marker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accounting Allocation"));

    ws.cmd()
        .args(["config", "set", "extraction.auto_correct", "false"])
        .assert()
        .success();

    ws.cmd()
        .args(["config", "get", "extraction.auto_correct"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));

    ws.cmd()
        .args(["config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn test_config_set_ocr_command_on_fresh_config() {
    let ws = Workspace::new();
    let fresh = ws.path().join("fresh").join("config.json");

    Command::cargo_bin("pettycash")
        .unwrap()
        .arg("--config")
        .arg(&fresh)
        .args(["config", "set", "ocr.command", r#"["python3","runner.py"]"#])
        .assert()
        .success();

    Command::cargo_bin("pettycash")
        .unwrap()
        .arg("--config")
        .arg(&fresh)
        .args(["config", "get", "ocr.command"])
        .assert()
        .success()
        .stdout(predicate::str::contains("runner.py"));
}

#[cfg(unix)]
#[test]
fn test_ingest_image_with_ocr_command() {
    let ws = Workspace::with_ocr(serde_json::json!([
        "sh",
        "-c",
        r#"printf '{"text": "Voucher No [ 3003 ]\\nStationery  120  00"}'"#,
        "runner"
    ]));
    let image = ws.file("scan.png", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");

    ws.cmd()
        .arg("ingest")
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved voucher 1"));

    let output = ws.cmd().args(["show", "1"]).output().unwrap();
    let voucher: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(voucher["voucher_no"], "3003");
    assert_eq!(voucher["line_items"][0]["details"], "Stationery");
}

#[cfg(unix)]
#[test]
fn test_ocr_command_error_surfaces() {
    let ws = Workspace::with_ocr(serde_json::json!([
        "sh",
        "-c",
        r#"echo '{"error": "image too blurry"}'; exit 2"#,
        "runner"
    ]));
    let image = ws.file("scan.png", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");

    ws.cmd()
        .arg("extract")
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("image too blurry"));
}
