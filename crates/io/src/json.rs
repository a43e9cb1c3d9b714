// JSON report export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tender_recon::ReconResult;

/// Write the full comparison result (meta, summaries, per-sheet reports,
/// annotations) as pretty-printed JSON.
pub fn export_report(result: &ReconResult, path: &Path) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, result).map_err(|e| e.to_string())?;

    Ok(())
}
