// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use newsmatch_engine::RunReport;

/// Export the whole run report (meta, load statistics, diagnostics, matches).
pub fn export(report: &RunReport, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn to_string(report: &RunReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| e.to_string())
}
