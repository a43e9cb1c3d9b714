use serde::Serialize;

// ---------------------------------------------------------------------------
// Cells + grids
// ---------------------------------------------------------------------------

/// Untyped cell content as loaded from a sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Stringified form used for header matching and column names.
    /// Integral numbers render without a trailing `.0`.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One sheet as loaded, with no header interpretation. Rows may be ragged;
/// out-of-range reads yield `Empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 0-indexed cell access.
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SourceSheet {
    pub name: String,
    pub grid: Grid,
}

/// One contractor's workbook, in the order it was supplied.
#[derive(Debug, Clone)]
pub struct SourceWorkbook {
    pub file_name: String,
    pub sheets: Vec<SourceSheet>,
}

// ---------------------------------------------------------------------------
// Merged tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedColumn {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Same-named sheets from every workbook, concatenated side-by-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedSheet {
    pub name: String,
    pub columns: Vec<MergedColumn>,
}

impl MergedSheet {
    /// Number of data rows (longest column).
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// Render as a grid: column names in row 0, data rows below.
    pub fn to_grid(&self) -> Grid {
        let height = self.row_count();
        let mut rows = Vec::with_capacity(height + 1);
        rows.push(
            self.columns
                .iter()
                .map(|c| CellValue::from(c.name.as_str()))
                .collect(),
        );
        for r in 0..height {
            rows.push(
                self.columns
                    .iter()
                    .map(|c| c.values.get(r).cloned().unwrap_or_default())
                    .collect(),
            );
        }
        Grid::new(rows)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedBook {
    pub sheets: Vec<MergedSheet>,
}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Rate,
    Amount,
    Quantity,
    Other,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rate => write!(f, "rate"),
            Self::Amount => write!(f, "amount"),
            Self::Quantity => write!(f, "quantity"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Column indices (1-based) per role. Rate and amount lists pair by ordinal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub rate_cols: Vec<usize>,
    pub amount_cols: Vec<usize>,
    pub qty_col: Option<usize>,
}

impl ColumnRoles {
    /// No rate and no amount columns: the sheet is not comparable.
    pub fn is_empty(&self) -> bool {
        self.rate_cols.is_empty() && self.amount_cols.is_empty()
    }

    /// Keep only the first `n` contractors. Applies only when there are more
    /// than `n` rate columns; amount columns are cut to the same ordinal.
    pub fn truncate_contractors(&mut self, n: usize) {
        if self.rate_cols.len() > n {
            self.rate_cols.truncate(n);
            self.amount_cols.truncate(n);
        }
    }

    /// Amount column paired with the `j`-th rate column.
    pub fn amount_for(&self, j: usize) -> Option<usize> {
        self.amount_cols.get(j).copied()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Lowest,
    Highest,
    Missing,
    Neither,
}

/// Per-cell annotation handed to the styling sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTag {
    Lowest,
    Highest,
    Missing,
    Attention,
    None,
}

impl std::fmt::Display for CellTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lowest => write!(f, "lowest"),
            Self::Highest => write!(f, "highest"),
            Self::Missing => write!(f, "missing"),
            Self::Attention => write!(f, "attention"),
            Self::None => write!(f, "none"),
        }
    }
}

/// One contractor's figures in one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorSlot {
    pub rate_col: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_col: Option<usize>,
    pub effective: Option<f64>,
    /// Effective value came from the rate cell, not amount / quantity.
    pub rate_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotOutcome {
    #[serde(flatten)]
    pub slot: ContractorSlot,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    /// 1-based row in the merged sheet grid.
    pub row: usize,
    pub quantity: Option<f64>,
    pub slots: Vec<SlotOutcome>,
}

/// Coordinates are 1-based, matching the written workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellAnnotation {
    pub sheet: String,
    pub row: usize,
    pub col: usize,
    pub tag: CellTag,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub lowest: usize,
    pub highest: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    /// 1-based header row.
    pub header_row: usize,
    /// 1-based first row below the header; panes freeze here.
    pub frozen_row: usize,
    pub roles: ColumnRoles,
    pub rows: Vec<RowOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub first_three_only: bool,
    pub header_search_rows: usize,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summaries: Vec<SheetSummary>,
    pub sheets: Vec<SheetReport>,
    pub annotations: Vec<CellAnnotation>,
}

impl ReconResult {
    pub fn total_missing(&self) -> usize {
        self.summaries.iter().map(|s| s.missing).sum()
    }

    pub fn report(&self, sheet: &str) -> Option<&SheetReport> {
        self.sheets.iter().find(|s| s.sheet == sheet)
    }

    /// Annotations for one sheet, in emission order.
    pub fn annotations_for<'a>(&'a self, sheet: &'a str) -> impl Iterator<Item = &'a CellAnnotation> + 'a {
        self.annotations.iter().filter(move |a| a.sheet == sheet)
    }
}
