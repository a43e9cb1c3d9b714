//! `tender-recon`: BoQ merge and bid comparison engine.
//!
//! Pure engine crate: receives pre-loaded sheet grids, returns merged tables,
//! per-cell annotations and per-sheet summary counts. No CLI or IO
//! dependencies.

pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod header;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod reconcile;

pub use config::ReconConfig;
pub use engine::{merge_and_compare, run};
pub use error::ReconError;
pub use model::{
    CellTag, CellValue, Grid, MergedBook, ReconResult, SheetSummary, SourceSheet, SourceWorkbook,
};
