use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn invrep(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invrep").unwrap();
    cmd.env("XDG_CONFIG_HOME", home);
    cmd
}

fn write_extractions(dir: &Path) {
    let input = dir.join("input");
    fs::create_dir_all(&input).unwrap();

    fs::write(
        input.join("fb.json"),
        r#"{
            "filename": "fb.pdf",
            "platform": "facebook",
            "records": [
                {"invoice_number": "INV-1", "line_number": 1, "description": "Q1 campaign",
                 "amount": 100.00, "agency": "pk", "campaign_id": "123"}
            ]
        }"#,
    )
    .unwrap();

    fs::write(
        input.join("gg.json"),
        r#"[
            {
                "filename": "gg.pdf",
                "platform": "google",
                "records": [
                    {"invoice_number": "G-7", "line_number": 1,
                     "description": "Search \"brand\" ads", "amount": "50.50"}
                ]
            },
            {"filename": "broken.pdf", "error": "unreadable scan"}
        ]"#,
    )
    .unwrap();
}

fn build_report(dir: &Path) -> std::path::PathBuf {
    write_extractions(dir);
    let report = dir.join("out").join("report.json");
    invrep(dir)
        .arg("report")
        .arg(dir.join("input").join("*.json").to_str().unwrap())
        .arg("--output")
        .arg(&report)
        .assert()
        .success();
    report
}

#[test]
fn test_report_merges_platforms() {
    let dir = TempDir::new().unwrap();
    write_extractions(dir.path());

    invrep(dir.path())
        .arg("report")
        .arg(dir.path().join("input").join("*.json").to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_files\": 2"))
        .stdout(predicate::str::contains("\"total_amount\": 150.50"))
        .stdout(predicate::str::contains("\"files_processed\": 2"))
        .stdout(predicate::str::contains("\"invoice_type\": \"AP\""))
        .stdout(predicate::str::contains("\"invoice_type\": \"Non-AP\""))
        .stderr(predicate::str::contains("broken.pdf: unreadable scan"));
}

#[test]
fn test_report_writes_csv_exports() {
    let dir = TempDir::new().unwrap();
    write_extractions(dir.path());
    let exports = dir.path().join("exports");

    invrep(dir.path())
        .arg("report")
        .arg(dir.path().join("input").join("*.json").to_str().unwrap())
        .arg("--output-dir")
        .arg(&exports)
        .arg("--items-csv")
        .arg("--summary")
        .assert()
        .success();

    let items = fs::read_to_string(exports.join("invoice_report.csv")).unwrap();
    assert!(items.starts_with("\"platform\",\"source_filename\""));
    assert!(items.contains("\"Search \"\"brand\"\" ads\""));

    let summary = fs::read_to_string(exports.join("invoice_summary.csv")).unwrap();
    assert!(summary.contains("\"Facebook\",\"1\",\"1\",\"100.00\",\"1\""));

    assert!(exports.join("invoice_file_summary.csv").exists());
}

#[test]
fn test_report_rejects_duplicates_on_request() {
    let dir = TempDir::new().unwrap();
    write_extractions(dir.path());
    fs::write(
        dir.path().join("input").join("fb_again.json"),
        r#"{"filename": "fb.pdf", "platform": "facebook", "records": []}"#,
    )
    .unwrap();
    let pattern = dir.path().join("input").join("*.json");

    invrep(dir.path())
        .arg("report")
        .arg(pattern.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_files\": 3"));

    invrep(dir.path())
        .arg("report")
        .arg(pattern.to_str().unwrap())
        .arg("--reject-duplicates")
        .assert()
        .failure()
        .stderr(predicate::str::contains("fb.pdf"));
}

#[test]
fn test_report_survives_oversized_amounts() {
    let dir = TempDir::new().unwrap();
    write_extractions(dir.path());
    fs::write(
        dir.path().join("input").join("huge.json"),
        r#"{
            "filename": "huge.pdf",
            "platform": "tiktok",
            "records": [
                {"amount": "79228162514264337593543950335"},
                {"amount": "79228162514264337593543950335"}
            ]
        }"#,
    )
    .unwrap();

    invrep(dir.path())
        .arg("report")
        .arg(dir.path().join("input").join("*.json").to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_amount\": 150.50"))
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_report_without_matches_fails() {
    let dir = TempDir::new().unwrap();

    invrep(dir.path())
        .arg("report")
        .arg(dir.path().join("*.json").to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_filter_by_query() {
    let dir = TempDir::new().unwrap();
    let report = build_report(dir.path());

    invrep(dir.path())
        .arg("filter")
        .arg(&report)
        .args(["--query", "q1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-1"))
        .stdout(predicate::str::contains("G-7").not());

    invrep(dir.path())
        .arg("filter")
        .arg(&report)
        .args(["--platform", "tiktok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoices found"));
}

#[test]
fn test_export_items_csv() {
    let dir = TempDir::new().unwrap();
    let report = build_report(dir.path());
    let csv = dir.path().join("items.csv");

    invrep(dir.path())
        .arg("export")
        .arg(&report)
        .args(["--format", "items-csv", "--bom"])
        .arg("--output")
        .arg(&csv)
        .assert()
        .success();

    let content = fs::read_to_string(&csv).unwrap();
    assert!(content.starts_with('\u{feff}'));
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    invrep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "export.csv_bom", "true"])
        .assert()
        .success();

    invrep(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "export.csv_bom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
}
