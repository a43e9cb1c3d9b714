use serde::Deserialize;

use crate::error::ReconError;
use crate::header::HEADER_SEARCH_ROWS;

/// Contractor count kept when `first_three_only` is set.
pub const FIRST_CONTRACTORS: usize = 3;

/// Default name of the highlighted comparison workbook.
pub const DEFAULT_XLSX_OUTPUT: &str = "Tender_BoQ_Comparison_Formatted.xlsx";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    /// Compare only the first three contractor rate columns of each sheet.
    #[serde(default)]
    pub first_three_only: bool,
    /// Leading rows scanned when looking for the header row.
    #[serde(default = "default_header_search_rows")]
    pub header_search_rows: usize,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_header_search_rows() -> usize {
    HEADER_SEARCH_ROWS
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            first_three_only: false,
            header_search_rows: HEADER_SEARCH_ROWS,
            output: OutputConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Highlighted comparison workbook.
    #[serde(default)]
    pub xlsx: Option<String>,
    /// Full JSON report.
    #[serde(default)]
    pub json: Option<String>,
    /// Per-sheet summary table as CSV.
    #[serde(default)]
    pub summary_csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.header_search_rows == 0 {
            return Err(ReconError::ConfigValidation(
                "header_search_rows must be at least 1".into(),
            ));
        }

        for (key, path) in [
            ("output.xlsx", &self.output.xlsx),
            ("output.json", &self.output.json),
            ("output.summary_csv", &self.output.summary_csv),
        ] {
            if matches!(path, Some(p) if p.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        Ok(())
    }

    /// Contractor limit implied by `first_three_only`.
    pub fn contractor_limit(&self) -> Option<usize> {
        self.first_three_only.then_some(FIRST_CONTRACTORS)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
