// Summary table export as CSV

use std::io::Write;
use std::path::Path;

use tender_recon::SheetSummary;

pub const SUMMARY_HEADERS: [&str; 4] = ["Sheet", "Lowest (Green)", "Highest (Red)", "Missing (Yellow)"];

pub fn export_summary(summaries: &[SheetSummary], path: &Path) -> Result<(), String> {
    let file = std::fs::File::create(path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    write_summary(summaries, file)
}

/// Write the summary table, one row per compared sheet, in merge order.
pub fn write_summary<W: Write>(summaries: &[SheetSummary], out: W) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(SUMMARY_HEADERS).map_err(|e| e.to_string())?;
    for s in summaries {
        writer
            .write_record([
                s.sheet.clone(),
                s.lowest.to_string(),
                s.highest.to_string(),
                s.missing.to_string(),
            ])
            .map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
