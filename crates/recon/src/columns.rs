use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ColumnRole, ColumnRoles, Grid};

static RATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)RATE").unwrap());
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)AMOUNT").unwrap());
static QTY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)QTY|QUANTITY").unwrap());

/// Header text for every column of `row`, trimmed. Blank cells are "".
pub fn header_texts(grid: &Grid, row: usize) -> Vec<String> {
    (0..grid.col_count())
        .map(|c| grid.get(row, c).display().trim().to_string())
        .collect()
}

/// Build the rate / amount / quantity column lists from header text.
///
/// Each list is built independently, so a header such as "RATE x AMOUNT"
/// lands in both. Quantity keeps only the first match.
pub fn classify_columns(headers: &[String]) -> ColumnRoles {
    let mut roles = ColumnRoles::default();
    for (i, h) in headers.iter().enumerate() {
        let col = i + 1;
        if RATE_PATTERN.is_match(h) {
            roles.rate_cols.push(col);
        }
        if AMOUNT_PATTERN.is_match(h) {
            roles.amount_cols.push(col);
        }
        if roles.qty_col.is_none() && QTY_PATTERN.is_match(h) {
            roles.qty_col = Some(col);
        }
    }
    roles
}

/// Primary role of a single header, checked rate → amount → quantity.
pub fn column_role(header: &str) -> ColumnRole {
    if RATE_PATTERN.is_match(header) {
        ColumnRole::Rate
    } else if AMOUNT_PATTERN.is_match(header) {
        ColumnRole::Amount
    } else if QTY_PATTERN.is_match(header) {
        ColumnRole::Quantity
    } else {
        ColumnRole::Other
    }
}
