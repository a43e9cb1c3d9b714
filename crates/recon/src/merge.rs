//! Union same-named sheets from several contractor workbooks.
//!
//! Rows are aligned by position, not by item key: every contractor file is
//! assumed to list the same items in the same order. The first contributor
//! supplies the shared item/description columns; later contributors drop
//! their first two columns.

use std::collections::HashMap;

use crate::model::{CellValue, MergedBook, MergedColumn, MergedSheet, SourceSheet, SourceWorkbook};

/// Leading columns dropped from every contributor after the first.
pub const SHARED_LEADING_COLUMNS: usize = 2;

/// Maximum length of the per-file column prefix.
pub const PREFIX_MAX_LEN: usize = 8;

/// Column prefix for a source file: name up to the first `.`, ASCII
/// alphanumerics only, at most 8 characters.
pub fn shorten_name(file_name: &str) -> String {
    let base = file_name.split('.').next().unwrap_or("");
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(PREFIX_MAX_LEN)
        .collect()
}

/// Merge all workbooks, one merged table per distinct sheet name, in order
/// of first appearance.
pub fn merge_workbooks(sources: &[SourceWorkbook]) -> MergedBook {
    let mut order: Vec<&str> = Vec::new();
    let mut contributors: HashMap<&str, Vec<(&SourceWorkbook, &SourceSheet)>> = HashMap::new();

    for wb in sources {
        for sheet in &wb.sheets {
            let entry = contributors.entry(sheet.name.as_str()).or_insert_with(|| {
                order.push(sheet.name.as_str());
                Vec::new()
            });
            entry.push((wb, sheet));
        }
    }

    let sheets = order
        .into_iter()
        .map(|name| {
            let parts = contributors.remove(name).unwrap_or_default();
            merge_sheet(name, &parts)
        })
        .collect();

    MergedBook { sheets }
}

/// Concatenate one sheet's contributors side-by-side.
pub fn merge_sheet(name: &str, parts: &[(&SourceWorkbook, &SourceSheet)]) -> MergedSheet {
    let mut columns = Vec::new();
    for (idx, (wb, sheet)) in parts.iter().enumerate() {
        let prefix = shorten_name(&wb.file_name);
        let cols = source_columns(sheet, &prefix);
        if idx == 0 {
            columns.extend(cols);
        } else {
            columns.extend(cols.into_iter().skip(SHARED_LEADING_COLUMNS).map(|c| MergedColumn {
                name: format!("{prefix}_{}", c.name),
                values: c.values,
            }));
        }
    }

    MergedSheet {
        name: name.to_string(),
        columns,
    }
}

/// Split a source sheet into named columns. Row 0 holds the names; blank
/// names become `{prefix}Col{n}` and repeated names get `.1`, `.2`, ...
fn source_columns(sheet: &SourceSheet, prefix: &str) -> Vec<MergedColumn> {
    let grid = &sheet.grid;
    let width = grid.col_count();
    let data_rows = grid.row_count().saturating_sub(1);

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::with_capacity(width);

    for c in 0..width {
        let raw = grid.get(0, c).display();
        let base = if raw.trim().is_empty() {
            format!("{prefix}Col{}", c + 1)
        } else {
            raw
        };
        let name = unique_name(&mut seen, base);

        let values: Vec<CellValue> = (1..=data_rows).map(|r| grid.get(r, c).clone()).collect();
        columns.push(MergedColumn { name, values });
    }
    columns
}

fn unique_name(seen: &mut HashMap<String, usize>, base: String) -> String {
    let Some(count) = seen.get(&base).copied() else {
        seen.insert(base.clone(), 0);
        return base;
    };

    let mut n = count + 1;
    let mut candidate = format!("{base}.{n}");
    while seen.contains_key(&candidate) {
        n += 1;
        candidate = format!("{base}.{n}");
    }
    seen.insert(base, n);
    seen.insert(candidate.clone(), 0);
    candidate
}
