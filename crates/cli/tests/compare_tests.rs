// Integration tests for the `boq` binary.
//
// Fixture workbooks are generated into a temp dir at test time so the tests
// don't depend on checked-in binaries.
//
// Run with: cargo test -p tender-cli --test compare_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

const HEADER: &[&str] = &["ITEM", "DESCRIPTION", "QTY", "RATE", "AMOUNT"];

fn boq(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_boq"));
    cmd.current_dir(dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Write a one-sheet workbook. Numeric-looking cells are written as numbers,
/// empty strings are left blank.
fn write_book(path: &Path, sheet: &str, rows: &[&[&str]]) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet().set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            if v.is_empty() {
                continue;
            }
            match v.parse::<f64>() {
                Ok(n) => ws.write_number(r as u32, c as u16, n).unwrap(),
                Err(_) => ws.write_string(r as u32, c as u16, *v).unwrap(),
            };
        }
    }
    wb.save(path).unwrap();
}

/// alpha misses the Walling rate; beta is cheaper on Excavation.
fn fixtures() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let alpha = dir.path().join("alpha.xlsx");
    let beta = dir.path().join("beta.xlsx");
    write_book(
        &alpha,
        "Bill 1",
        &[HEADER, &["1", "Excavation", "10", "100", "1000"], &["2", "Walling", "5", "", ""]],
    );
    write_book(
        &beta,
        "Bill 1",
        &[HEADER, &["1", "Excavation", "10", "90", "900"], &["2", "Walling", "5", "40", "200"]],
    );
    (dir, alpha, beta)
}

fn path_arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn read_sheet(path: &Path, sheet: &str) -> Vec<Vec<Data>> {
    let mut wb = open_workbook_auto(path).unwrap();
    let range = wb.worksheet_range(sheet).unwrap();
    range.rows().map(|r| r.to_vec()).collect()
}

// ===========================================================================
// boq compare
// ===========================================================================

#[test]
fn compare_writes_merged_workbook_and_summary() {
    let (dir, alpha, beta) = fixtures();
    let out = dir.path().join("out.xlsx");

    let output = boq(dir.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta), "--output", path_arg(&out)])
        .output()
        .expect("boq compare");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty(), "human output belongs on stderr");

    let err = stderr(&output);
    assert!(err.contains("wrote"), "stderr: {err}");
    assert!(err.contains("Bill 1"), "stderr: {err}");

    let rows = read_sheet(&out, "Bill 1");
    let names: Vec<String> = rows[0].iter().map(|d| d.to_string()).collect();
    assert_eq!(
        names,
        vec!["ITEM", "DESCRIPTION", "QTY", "RATE", "AMOUNT", "beta_QTY", "beta_RATE", "beta_AMOUNT"]
    );
    assert_eq!(rows[1][6], Data::Float(90.0));
}

#[test]
fn compare_defaults_output_name() {
    let (dir, alpha, beta) = fixtures();

    let output = boq(dir.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta)])
        .output()
        .expect("boq compare");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("Tender_BoQ_Comparison_Formatted.xlsx").is_file());
}

#[test]
fn compare_json_reports_counts() {
    let (dir, alpha, beta) = fixtures();

    let output = boq(dir.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta), "--json"])
        .output()
        .expect("boq compare --json");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");

    let summary = &val["summaries"][0];
    assert_eq!(summary["sheet"], "Bill 1");
    assert_eq!(summary["lowest"], 2);
    assert_eq!(summary["highest"], 1);
    assert_eq!(summary["missing"], 1);

    let report = &val["sheets"][0];
    assert_eq!(report["header_row"], 1);
    assert_eq!(report["frozen_row"], 2);
    assert_eq!(report["roles"]["rate_cols"], serde_json::json!([4, 7]));
    assert_eq!(report["roles"]["qty_col"], 3);
}

#[test]
fn compare_strict_fails_on_missing_bids() {
    let (dir, alpha, beta) = fixtures();

    let output = boq(dir.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta), "--strict"])
        .output()
        .expect("boq compare --strict");

    assert_eq!(output.status.code(), Some(6));
    let err = stderr(&output);
    assert!(err.contains("error: 1 missing bid(s) found"), "stderr: {err}");
    assert!(err.contains("hint:"), "stderr: {err}");
}

#[test]
fn compare_strict_passes_when_all_priced() {
    let dir = tempfile::tempdir().unwrap();
    let alpha = dir.path().join("alpha.xlsx");
    let beta = dir.path().join("beta.xlsx");
    write_book(&alpha, "Bill 1", &[HEADER, &["1", "Excavation", "10", "100", ""]]);
    write_book(&beta, "Bill 1", &[HEADER, &["1", "Excavation", "10", "", "950"]]);

    let output = boq(dir.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta), "--strict"])
        .output()
        .expect("boq compare --strict");

    // beta's rate is derived from amount / qty, which counts as a bid
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn compare_writes_report_and_summary_csv() {
    let (dir, alpha, beta) = fixtures();
    let report = dir.path().join("report.json");
    let csv = dir.path().join("summary.csv");

    let output = boq(dir.path())
        .args([
            "compare",
            path_arg(&alpha),
            path_arg(&beta),
            "--report",
            path_arg(&report),
            "--summary-csv",
            path_arg(&csv),
        ])
        .output()
        .expect("boq compare");

    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let content = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(
        content,
        "Sheet,Lowest (Green),Highest (Red),Missing (Yellow)\nBill 1,2,1,1\n"
    );

    let val: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(val["meta"]["first_three_only"], false);
    assert!(val["annotations"].as_array().unwrap().iter().any(|a| a["tag"] == "missing"));
}

#[test]
fn compare_uses_config_outputs_relative_to_config() {
    let (dir, alpha, beta) = fixtures();
    let config = dir.path().join("tender.toml");
    std::fs::write(
        &config,
        "first_three_only = true\n\n[output]\nxlsx = \"from-config.xlsx\"\nsummary_csv = \"from-config.csv\"\n",
    )
    .unwrap();

    // Run from elsewhere: paths must resolve against the config's directory
    let elsewhere = tempfile::tempdir().unwrap();
    let output = boq(elsewhere.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta), "--config", path_arg(&config), "--json"])
        .output()
        .expect("boq compare --config");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("from-config.xlsx").is_file());
    assert!(dir.path().join("from-config.csv").is_file());

    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val["meta"]["first_three_only"], true);
}

#[test]
fn compare_sheet_without_rate_is_not_summarised() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.xlsx");
    write_book(&notes, "Summary", &[&["ITEM", "DESCRIPTION", "AMOUNT"], &["1", "Bill 1 total", "10000"]]);

    let output = boq(dir.path())
        .args(["compare", path_arg(&notes), "--json"])
        .output()
        .expect("boq compare");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val["summaries"], serde_json::json!([]));
    assert!(stderr(&output).contains("no sheets compared"));
}

// ===========================================================================
// Input errors
// ===========================================================================

#[test]
fn missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = boq(dir.path())
        .args(["compare", "does-not-exist.xlsx"])
        .output()
        .expect("boq compare");

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("does-not-exist.xlsx"));
}

#[test]
fn unreadable_workbook_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.xlsx");
    std::fs::write(&bogus, "this is not a spreadsheet").unwrap();

    let output = boq(dir.path())
        .args(["compare", path_arg(&bogus)])
        .output()
        .expect("boq compare");

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn no_input_files_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = boq(dir.path()).args(["compare"]).output().expect("boq compare");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn output_overwriting_input_is_rejected() {
    let (dir, alpha, beta) = fixtures();

    let output = boq(dir.path())
        .args(["compare", path_arg(&alpha), path_arg(&beta), "--output", path_arg(&alpha)])
        .output()
        .expect("boq compare");

    assert_eq!(output.status.code(), Some(2));
}

// ===========================================================================
// boq merge / headers / validate
// ===========================================================================

#[test]
fn merge_writes_side_by_side_columns() {
    let (dir, alpha, beta) = fixtures();
    let out = dir.path().join("merged.xlsx");

    let output = boq(dir.path())
        .args(["merge", path_arg(&alpha), path_arg(&beta), "--output", path_arg(&out)])
        .output()
        .expect("boq merge");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let rows = read_sheet(&out, "Bill 1");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 8);
    assert_eq!(rows[2][1], Data::String("Walling".into()));
    assert_eq!(rows[2][6], Data::Float(40.0));
}

#[test]
fn headers_json_lists_roles() {
    let (dir, alpha, beta) = fixtures();

    let output = boq(dir.path())
        .args(["headers", path_arg(&alpha), path_arg(&beta), "--json"])
        .output()
        .expect("boq headers");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(val[0]["sheet"], "Bill 1");
    assert_eq!(val[0]["header_row"], 1);
    assert_eq!(val[0]["roles"]["amount_cols"], serde_json::json!([5, 8]));

    let columns = val[0]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 6);
    assert_eq!(columns[0], serde_json::json!({"col": 3, "name": "QTY", "role": "quantity"}));
    assert_eq!(columns[1], serde_json::json!({"col": 4, "name": "RATE", "role": "rate"}));
    assert_eq!(columns[5], serde_json::json!({"col": 8, "name": "beta_AMOUNT", "role": "amount"}));
}

#[test]
fn headers_human_output_lists_column_roles() {
    let (dir, alpha, beta) = fixtures();

    let output = boq(dir.path())
        .args(["headers", path_arg(&alpha), path_arg(&beta)])
        .output()
        .expect("boq headers");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("Bill 1: header row 1"), "stderr: {err}");
    assert!(err.contains("rate      beta_RATE"), "stderr: {err}");
}

#[test]
fn validate_accepts_good_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tender.toml");
    std::fs::write(&config, "header_search_rows = 40\n").unwrap();

    let output = boq(dir.path())
        .args(["validate", path_arg(&config)])
        .output()
        .expect("boq validate");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("valid:"));
}

#[test]
fn validate_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("tender.toml");

    std::fs::write(&config, "header_search_rows = 0\n").unwrap();
    let output = boq(dir.path())
        .args(["validate", path_arg(&config)])
        .output()
        .expect("boq validate");
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("header_search_rows"));

    std::fs::write(&config, "unknown_key = 1\n").unwrap();
    let output = boq(dir.path())
        .args(["validate", path_arg(&config)])
        .output()
        .expect("boq validate");
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn long_version_reports_engine_and_build() {
    let dir = tempfile::tempdir().unwrap();
    let output = boq(dir.path()).arg("--version").output().expect("boq --version");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("engine:  tender-recon"), "stdout: {stdout}");
    assert!(stdout.contains("build:   "), "stdout: {stdout}");
    assert!(stdout.contains("target:  "), "stdout: {stdout}");
}
