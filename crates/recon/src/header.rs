use crate::model::{CellValue, Grid};

/// Default number of leading rows scanned for a header.
pub const HEADER_SEARCH_ROWS: usize = 30;

/// Score one candidate row. Returns `(score, has_rate)`.
///
/// Each cell contributes independently: ITEM +1, DESC/DESCRIPTION +1,
/// RATE +3, UNIT +1, QUANTITY/QTY +1.
pub fn score_row(cells: &[CellValue]) -> (u32, bool) {
    let mut score = 0;
    let mut has_rate = false;
    for cell in cells {
        let v = cell.display().trim().to_uppercase();
        if v.contains("ITEM") {
            score += 1;
        }
        if v.contains("DESC") {
            score += 1;
        }
        if v.contains("RATE") {
            score += 3;
            has_rate = true;
        }
        if v.contains("UNIT") {
            score += 1;
        }
        if v.contains("QUANTITY") || v.contains("QTY") {
            score += 1;
        }
    }
    (score, has_rate)
}

/// Find the bid-table header row (0-indexed) within the first `search_rows`
/// rows. Only rows mentioning RATE are eligible; the first row with the
/// strictly highest score wins.
pub fn locate_header(grid: &Grid, search_rows: usize) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for r in 0..search_rows.min(grid.row_count()) {
        let (score, has_rate) = score_row(grid.row(r));
        if !has_rate {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((r, score));
        }
    }
    best.map(|(r, _)| r)
}
