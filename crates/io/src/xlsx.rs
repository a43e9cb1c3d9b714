// Excel workbook loading (xlsx, xls, xlsb, ods) and comparison export (xlsx only)
//
// Loading: every sheet becomes a raw grid anchored at A1. No header
//          interpretation happens here.
// Export:  merged sheets written as plain values, optionally with the
//          comparison fills and a frozen header band.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::debug;
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet};
use tender_recon::model::{CellAnnotation, CellTag, CellValue, Grid, MergedBook, MergedSheet, SourceSheet, SourceWorkbook};
use tender_recon::ReconResult;

/// Fill for the lowest bid in a row.
pub const LOWEST_FILL: u32 = 0x00FF00;
/// Fill for the highest bid in a row.
pub const HIGHEST_FILL: u32 = 0xFF0000;
/// Fill for missing bids and rates derived from amount / quantity.
pub const ATTENTION_FILL: u32 = 0xFFFF00;

// ============================================================================
// Loading
// ============================================================================

/// Load an Excel file (xlsx, xls, xlsb, ods) from disk.
pub fn load_workbook(path: &Path) -> Result<SourceWorkbook, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    read_sheets(&mut workbook, file_name)
}

/// Load an in-memory workbook. `file_name` drives the column prefix used
/// when the workbook is merged after the first one.
pub fn load_workbook_from_bytes(file_name: &str, bytes: Vec<u8>) -> Result<SourceWorkbook, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| format!("Failed to open Excel file '{}': {}", file_name, e))?;

    read_sheets(&mut workbook, file_name.to_string())
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>, file_name: String) -> Result<SourceWorkbook, String> {
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(format!("Excel file '{}' contains no sheets", file_name));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

        let grid = range_to_grid(&range);
        debug!(
            "{}: sheet '{}' loaded, {} rows x {} cols",
            file_name,
            sheet_name,
            grid.row_count(),
            grid.col_count()
        );
        sheets.push(SourceSheet { name: sheet_name.clone(), grid });
    }

    Ok(SourceWorkbook { file_name, sheets })
}

/// Place the range at its absolute position. Calamine trims leading empty
/// rows and columns, so they are padded back in.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let Some((start_row, start_col)) = range.start() else {
        return Grid::default();
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }
    Grid::new(rows)
}

/// Map one calamine cell onto the engine's untyped cell.
pub fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        // TRUE/FALSE text, as Excel displays it
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Serial number; dates are never prices but keep them numeric
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Result of an Excel export operation
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Number of sheets exported
    pub sheets_exported: usize,
    /// Non-empty cells written
    pub cells_exported: usize,
    /// Cells that received a fill
    pub cells_highlighted: usize,
    /// Sheets with a frozen header band
    pub sheets_frozen: usize,
    /// Export duration in milliseconds
    pub export_duration_ms: u128,
}

impl ExportResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("{} sheet{}", self.sheets_exported, if self.sheets_exported == 1 { "" } else { "s" }),
            format!("{} cells", self.cells_exported),
        ];
        if self.cells_highlighted > 0 {
            parts.push(format!("{} highlighted", self.cells_highlighted));
        }
        parts.join(", ")
    }
}

/// Write the merged tables as-is, column names in row 1.
pub fn export_merged(book: &MergedBook, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();

    for sheet in &book.sheets {
        let worksheet = add_named_sheet(&mut xlsx_workbook, &sheet.name)?;
        let (cells, _) = write_sheet(worksheet, sheet, &HashMap::new())?;
        result.cells_exported += cells;
        result.sheets_exported += 1;
    }

    save(&mut xlsx_workbook, path)?;
    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

/// Write the merged tables with comparison fills applied and the header band
/// frozen on every compared sheet. Sheets that were skipped by the comparison
/// are written without styling.
pub fn export_comparison(book: &MergedBook, comparison: &ReconResult, path: &Path) -> Result<ExportResult, String> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();

    for sheet in &book.sheets {
        let fills = collect_fills(comparison.annotations_for(&sheet.name));

        let worksheet = add_named_sheet(&mut xlsx_workbook, &sheet.name)?;
        let (cells, highlighted) = write_sheet(worksheet, sheet, &fills)?;
        result.cells_exported += cells;
        result.cells_highlighted += highlighted;

        if let Some(report) = comparison.report(&sheet.name) {
            let frozen = report.frozen_row.saturating_sub(1);
            if frozen > 0 {
                worksheet
                    .set_freeze_panes(frozen as u32, 0)
                    .map_err(|e| format!("Failed to set freeze panes: {}", e))?;
                result.sheets_frozen += 1;
            }
        }

        result.sheets_exported += 1;
    }

    save(&mut xlsx_workbook, path)?;
    result.export_duration_ms = start_time.elapsed().as_millis();
    Ok(result)
}

fn add_named_sheet<'a>(workbook: &'a mut XlsxWorkbook, name: &str) -> Result<&'a mut Worksheet, String> {
    workbook
        .add_worksheet()
        .set_name(name)
        .map_err(|e| format!("Failed to create sheet '{}': {}", name, e))
}

fn save(workbook: &mut XlsxWorkbook, path: &Path) -> Result<(), String> {
    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))
}

/// Rank of a tag when two annotations land on the same cell, which happens
/// when one header is both a rate and an amount column.
fn fill_priority(tag: CellTag) -> u8 {
    match tag {
        CellTag::Missing => 3,
        CellTag::Attention => 2,
        CellTag::Lowest | CellTag::Highest => 1,
        CellTag::None => 0,
    }
}

/// Fill per 1-based (row, col). On a collision the higher-priority tag is
/// kept; between equals the first annotation stands.
fn collect_fills<'a>(annotations: impl Iterator<Item = &'a CellAnnotation>) -> HashMap<(usize, usize), CellTag> {
    let mut fills: HashMap<(usize, usize), CellTag> = HashMap::new();
    for a in annotations {
        fills
            .entry((a.row, a.col))
            .and_modify(|held| {
                if fill_priority(a.tag) > fill_priority(*held) {
                    *held = a.tag;
                }
            })
            .or_insert(a.tag);
    }
    fills
}

/// Background fill for a tag. `None` leaves the cell untouched.
pub fn tag_format(tag: CellTag) -> Option<Format> {
    let rgb = match tag {
        CellTag::Lowest => LOWEST_FILL,
        CellTag::Highest => HIGHEST_FILL,
        CellTag::Missing | CellTag::Attention => ATTENTION_FILL,
        CellTag::None => return None,
    };
    Some(Format::new().set_background_color(Color::RGB(rgb)))
}

/// Returns (non-empty cells written, cells filled).
fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &MergedSheet,
    fills: &HashMap<(usize, usize), CellTag>,
) -> Result<(usize, usize), String> {
    let grid = sheet.to_grid();
    let mut cells = 0;
    let mut highlighted = 0;

    for (row, values) in grid.rows().iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            let format = fills.get(&(row + 1, col + 1)).and_then(|tag| tag_format(*tag));
            let r = u32::try_from(row).map_err(|_| format!("Failed to write row {}: beyond the sheet limit", row))?;
            let c = u16::try_from(col).map_err(|_| format!("Failed to write column {}: beyond the sheet limit", col))?;

            let written = match (value, &format) {
                (CellValue::Empty, None) => continue,
                (CellValue::Empty, Some(f)) => worksheet.write_blank(r, c, f),
                (CellValue::Number(n), None) => worksheet.write_number(r, c, *n),
                (CellValue::Number(n), Some(f)) => worksheet.write_number_with_format(r, c, *n, f),
                (CellValue::Text(s), None) => worksheet.write_string(r, c, s),
                (CellValue::Text(s), Some(f)) => worksheet.write_string_with_format(r, c, s, f),
            };
            written.map_err(|e| format!("Failed to write cell ({}, {}): {}", row, col, e))?;

            if !value.is_empty() {
                cells += 1;
            }
            if format.is_some() {
                highlighted += 1;
            }
        }
    }

    Ok((cells, highlighted))
}
