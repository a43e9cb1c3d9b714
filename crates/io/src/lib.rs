// File I/O operations

pub mod csv;
pub mod json;
pub mod xlsx;

pub use xlsx::{export_comparison, export_merged, load_workbook, load_workbook_from_bytes, ExportResult};
