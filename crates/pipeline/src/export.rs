//! Pure projections of a finished run: summary table and full JSON.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::EntityResult;

pub const SUMMARY_HEADER: [&str; 4] = ["Entity", "Main Findings", "Confidence", "Source Quality"];

const NA: &str = "N/A";

/// Flatten results into one summary row per entity.  Absent fields — and the
/// whole analysis on error rows — project as `"N/A"`.
pub fn summary_rows(results: &[EntityResult]) -> Vec<[String; 4]> {
    results
        .iter()
        .map(|r| {
            let field = |value: Option<&str>| value.unwrap_or(NA).to_string();
            let analysis = r.analysis.as_ref();
            [
                r.entity.clone(),
                field(analysis.and_then(|a| a.extracted_info.as_deref())),
                field(analysis.and_then(|a| a.confidence.as_deref())),
                field(analysis.and_then(|a| a.source_quality.as_deref())),
            ]
        })
        .collect()
}

/// Write the summary projection as CSV.
pub fn write_summary_csv(results: &[EntityResult], writer: impl Write) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(SUMMARY_HEADER)
        .context("failed to write CSV header")?;
    for row in summary_rows(results) {
        csv_writer
            .write_record(&row)
            .context("failed to write CSV row")?;
    }
    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Write the summary CSV to `path`, creating parent directories.
pub fn write_summary_csv_file(results: &[EntityResult], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_summary_csv(results, file)
}

/// Structure-preserving pretty-printed JSON of the full result sequence.
pub fn to_json(results: &[EntityResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize results")
}

// ── Tests ────────────────────────────────────────────────────────────────────
