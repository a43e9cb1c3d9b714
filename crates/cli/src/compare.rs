//! `boq compare` / `boq merge` / `boq headers` / `boq validate`.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use tender_recon::columns::{classify_columns, column_role, header_texts};
use tender_recon::config::DEFAULT_XLSX_OUTPUT;
use tender_recon::header::locate_header;
use tender_recon::merge::merge_workbooks;
use tender_recon::model::{ColumnRole, ColumnRoles, SourceWorkbook};
use tender_recon::{merge_and_compare, ReconConfig, SheetSummary};

use crate::exit_codes::EXIT_MISSING_BIDS;
use crate::CliError;

pub struct CompareArgs {
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub first_three: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub report: Option<PathBuf>,
    pub summary_csv: Option<PathBuf>,
    pub strict: bool,
}

// ============================================================================
// Shared loading
// ============================================================================

/// Parse and validate a config file.
fn read_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;

    ReconConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))
}

/// Config plus the directory its relative output paths resolve against.
fn load_config(path: Option<&Path>) -> Result<(ReconConfig, PathBuf), CliError> {
    match path {
        Some(path) => {
            let config = read_config(path)?;
            let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            Ok((config, base_dir))
        }
        None => Ok((ReconConfig::default(), PathBuf::from("."))),
    }
}

/// Load every input in order. The first file anchors the merge, so order
/// on the command line matters.
fn load_inputs(files: &[PathBuf]) -> Result<Vec<SourceWorkbook>, CliError> {
    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        if !path.is_file() {
            return Err(CliError::io(format!("cannot read {}: no such file", path.display())));
        }
        let workbook = tender_io::load_workbook(path).map_err(|e| {
            CliError::parse(format!("{}: {e}", path.display()))
                .with_hint("inputs must be .xlsx, .xls, .xlsb or .ods workbooks")
        })?;
        info!("loaded {} ({} sheets)", workbook.file_name, workbook.sheets.len());
        sources.push(workbook);
    }
    Ok(sources)
}

/// Refuse to overwrite one of the inputs.
fn check_output(output: &Path, files: &[PathBuf]) -> Result<(), CliError> {
    if files.iter().any(|f| f == output) {
        return Err(CliError::args(format!(
            "output {} is also an input file",
            output.display()
        )));
    }
    Ok(())
}

// ============================================================================
// compare
// ============================================================================

pub fn cmd_compare(args: CompareArgs) -> Result<(), CliError> {
    let (mut config, base_dir) = load_config(args.config.as_deref())?;
    if args.first_three {
        config.first_three_only = true;
    }

    // Flags win over config; config paths are relative to the config file.
    let from_config = |p: &Option<String>| p.as_ref().map(|p| base_dir.join(p));
    let xlsx_path = args
        .output
        .clone()
        .or_else(|| from_config(&config.output.xlsx))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_XLSX_OUTPUT));
    let report_path = args.report.clone().or_else(|| from_config(&config.output.json));
    let csv_path = args.summary_csv.clone().or_else(|| from_config(&config.output.summary_csv));

    check_output(&xlsx_path, &args.files)?;

    let sources = load_inputs(&args.files)?;
    let (book, result) = merge_and_compare(&config, &sources);

    if result.summaries.is_empty() {
        warn!("no sheet has a header row with a RATE column; nothing was compared");
    }

    let export = tender_io::export_comparison(&book, &result, &xlsx_path)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", xlsx_path.display())))?;
    eprintln!("wrote {} ({})", xlsx_path.display(), export.summary());

    if let Some(ref path) = report_path {
        tender_io::json::export_report(&result, path)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = csv_path {
        tender_io::csv::export_summary(&result.summaries, path)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    eprint!("{}", render_summary(&result.summaries));

    let missing = result.total_missing();
    if args.strict && missing > 0 {
        return Err(CliError {
            code: EXIT_MISSING_BIDS,
            message: format!("{missing} missing bid(s) found"),
            hint: Some(format!("missing cells are highlighted yellow in {}", xlsx_path.display())),
        });
    }

    Ok(())
}

/// Fixed-width summary table, one line per compared sheet.
fn render_summary(summaries: &[SheetSummary]) -> String {
    if summaries.is_empty() {
        return "no sheets compared\n".to_string();
    }

    let width = summaries
        .iter()
        .map(|s| s.sheet.chars().count())
        .max()
        .unwrap_or(0)
        .max("Sheet".len());

    let mut out = format!("{:<width$}  {:>6}  {:>7}  {:>7}\n", "Sheet", "Lowest", "Highest", "Missing");
    for s in summaries {
        out.push_str(&format!(
            "{:<width$}  {:>6}  {:>7}  {:>7}\n",
            s.sheet, s.lowest, s.highest, s.missing
        ));
    }
    out
}

// ============================================================================
// merge
// ============================================================================

pub fn cmd_merge(files: Vec<PathBuf>, output: PathBuf) -> Result<(), CliError> {
    check_output(&output, &files)?;

    let sources = load_inputs(&files)?;
    let book = merge_workbooks(&sources);

    let export = tender_io::export_merged(&book, &output)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", output.display())))?;
    eprintln!("wrote {} ({})", output.display(), export.summary());

    Ok(())
}

// ============================================================================
// headers
// ============================================================================

#[derive(Debug, Serialize)]
struct HeaderReport {
    sheet: String,
    /// 1-based row in the merged sheet.
    header_row: Option<usize>,
    roles: Option<ColumnRoles>,
    /// Header cells with a recognised role, in column order.
    columns: Vec<HeaderColumn>,
}

#[derive(Debug, Serialize)]
struct HeaderColumn {
    /// 1-based column.
    col: usize,
    name: String,
    role: ColumnRole,
}

pub fn cmd_headers(files: Vec<PathBuf>, config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let (config, _) = load_config(config.as_deref())?;
    let sources = load_inputs(&files)?;
    let book = merge_workbooks(&sources);

    let reports: Vec<HeaderReport> = book
        .sheets
        .iter()
        .map(|sheet| {
            let grid = sheet.to_grid();
            let header = locate_header(&grid, config.header_search_rows);
            let texts = header.map(|r| header_texts(&grid, r)).unwrap_or_default();
            let roles = header.map(|_| {
                let mut roles = classify_columns(&texts);
                if let Some(limit) = config.contractor_limit() {
                    roles.truncate_contractors(limit);
                }
                roles
            });
            let columns = texts
                .into_iter()
                .enumerate()
                .filter_map(|(i, name)| match column_role(&name) {
                    ColumnRole::Other => None,
                    role => Some(HeaderColumn { col: i + 1, name, role }),
                })
                .collect();
            HeaderReport { sheet: sheet.name.clone(), header_row: header.map(|r| r + 1), roles, columns }
        })
        .collect();

    if json {
        let json_str = serde_json::to_string_pretty(&reports)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for report in &reports {
        match (&report.header_row, &report.roles) {
            (Some(row), Some(roles)) => eprintln!(
                "{}: header row {}, rate {:?}, amount {:?}, qty {}",
                report.sheet,
                row,
                roles.rate_cols,
                roles.amount_cols,
                roles.qty_col.map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
            ),
            _ => eprintln!("{}: no header row", report.sheet),
        }
        for column in &report.columns {
            eprintln!("  {:>4}  {:<8}  {}", column.col, column.role.to_string(), column.name);
        }
    }

    Ok(())
}

// ============================================================================
// validate
// ============================================================================

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    eprintln!(
        "valid: {}, header search {} row(s)",
        if config.first_three_only { "first three contractors" } else { "all contractors" },
        config.header_search_rows,
    );
    Ok(())
}
