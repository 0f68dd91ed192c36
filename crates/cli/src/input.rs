//! Delimited-text input: turn a CSV file into entity rows.

use std::path::Path;

use anyhow::{Context, Result, bail};
use websift_pipeline::EntityRow;

/// Read entity rows from a headered CSV file.
///
/// The entity column is chosen by header name when `column` is given,
/// otherwise the first column is used.  Rows with a blank entity cell are
/// skipped with a warning; any read problem aborts the run before the
/// pipeline starts.
pub fn read_rows(path: impl AsRef<Path>, column: Option<&str>) -> Result<Vec<EntityRow>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open input table {}", path.display()))?;

    let headers = reader
        .headers()
        .context("failed to read CSV headers")?
        .clone();
    if headers.is_empty() {
        bail!("input table has no columns");
    }

    let entity_idx = match column {
        Some(name) => headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("column {name:?} not found; available: {headers:?}"))?,
        None => 0,
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read CSV record {}", line + 1))?;
        let entity = record.get(entity_idx).unwrap_or("").trim();
        if entity.is_empty() {
            tracing::warn!(line = line + 2, "skipping row with blank entity cell");
            continue;
        }
        let aux = record
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != entity_idx)
            .map(|(_, cell)| cell.to_string())
            .collect();
        rows.push(EntityRow {
            entity: entity.to_string(),
            aux,
        });
    }

    Ok(rows)
}

// ── Tests ────────────────────────────────────────────────────────────────────
