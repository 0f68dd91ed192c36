//! Query templating, DuckDuckGo HTML search, and hit extraction.

mod client;
mod results;
mod template;

pub use client::SearchClient;
pub use results::{SearchHit, extract_hits, format_hits};
pub use template::{TemplateError, render_query};
