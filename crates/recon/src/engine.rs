use log::{debug, info};

use crate::columns::{classify_columns, header_texts};
use crate::config::ReconConfig;
use crate::header::locate_header;
use crate::merge::merge_workbooks;
use crate::model::{Grid, MergedBook, ReconMeta, ReconResult, SourceWorkbook};
use crate::reconcile::{reconcile_sheet, SheetComparison};

/// Compare every merged sheet. Sheets without a header row or without any
/// rate/amount columns are skipped and produce no summary.
pub fn run(config: &ReconConfig, book: &MergedBook) -> ReconResult {
    let mut summaries = Vec::new();
    let mut sheets = Vec::new();
    let mut annotations = Vec::new();

    for merged in &book.sheets {
        let grid = merged.to_grid();
        let Some(cmp) = compare_sheet(config, &merged.name, &grid) else {
            continue;
        };

        info!(
            "sheet '{}': {} lowest, {} highest, {} missing",
            cmp.summary.sheet, cmp.summary.lowest, cmp.summary.highest, cmp.summary.missing
        );
        summaries.push(cmp.summary);
        sheets.push(cmp.report);
        annotations.extend(cmp.annotations);
    }

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            first_three_only: config.first_three_only,
            header_search_rows: config.header_search_rows,
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summaries,
        sheets,
        annotations,
    }
}

/// Merge the workbooks, then compare. Returns the merged tables alongside the
/// result so the caller can write both.
pub fn merge_and_compare(config: &ReconConfig, sources: &[SourceWorkbook]) -> (MergedBook, ReconResult) {
    let book = merge_workbooks(sources);
    let result = run(config, &book);
    (book, result)
}

/// Locate the header, classify columns and reconcile one sheet grid.
pub fn compare_sheet(config: &ReconConfig, sheet: &str, grid: &Grid) -> Option<SheetComparison> {
    let Some(header_row) = locate_header(grid, config.header_search_rows) else {
        debug!("sheet '{sheet}': no header row within {} rows, skipped", config.header_search_rows);
        return None;
    };

    let mut roles = classify_columns(&header_texts(grid, header_row));
    if roles.is_empty() {
        debug!("sheet '{sheet}': header row {} has no rate or amount columns, skipped", header_row + 1);
        return None;
    }
    if let Some(limit) = config.contractor_limit() {
        roles.truncate_contractors(limit);
    }

    debug!(
        "sheet '{sheet}': header row {}, rate {:?}, amount {:?}, qty {:?}",
        header_row + 1,
        roles.rate_cols,
        roles.amount_cols,
        roles.qty_col
    );

    Some(reconcile_sheet(sheet, grid, header_row, &roles))
}
