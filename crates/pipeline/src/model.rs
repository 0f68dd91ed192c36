//! Input and output records for one pipeline run.

use serde::{Deserialize, Serialize};
use websift_extract::Analysis;

/// One input row: the entity to research plus whatever other columns the
/// source table carried.  The enrichment core only ever reads `entity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRow {
    pub entity: String,
    /// Remaining cells of the source record, in column order.  Carried along
    /// untouched so callers can join results back onto their table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aux: Vec<String>,
}

impl EntityRow {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            aux: Vec::new(),
        }
    }
}

/// One output record per input row, immutable once created.
///
/// Exactly one of `analysis` / `error` is set: `analysis` when the row made
/// it through search and analysis (a sentinel analysis still counts),
/// `error` when a row-scoped fault stopped processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityResult {
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl EntityResult {
    pub fn completed(entity: String, search_query: String, analysis: Analysis) -> Self {
        Self {
            entity,
            search_query: Some(search_query),
            analysis: Some(analysis),
            error: None,
            timestamp: now(),
        }
    }

    pub fn failed(entity: String, search_query: Option<String>, error: String) -> Self {
        Self {
            entity,
            search_query,
            analysis: None,
            error: Some(error),
            timestamp: now(),
        }
    }
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
