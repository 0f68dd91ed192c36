//! Sequential enrichment pipeline: per-entity search + LLM analysis with
//! row-level fault isolation, fixed-interval throttling, and CSV/JSON exports.

mod export;
mod model;
mod orchestrator;
mod throttle;

pub use export::{
    SUMMARY_HEADER, summary_rows, to_json, write_summary_csv, write_summary_csv_file,
};
pub use model::{EntityResult, EntityRow};
pub use orchestrator::{Pipeline, Progress, SearchProvider};
pub use throttle::Throttle;
