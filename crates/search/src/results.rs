//! Structural extraction of (title, snippet) pairs from result-page markup.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// One search result: a title and its snippet, in engine order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

/// Pull up to `limit` hits out of `markup` using the DuckDuckGo HTML result
/// selectors.  Containers missing a title or a snippet are skipped.  Markup
/// with no matching containers — empty pages, no-result pages, or a changed
/// page structure — yields an empty vec, never an error.
pub fn extract_hits(markup: &str, limit: usize) -> Vec<SearchHit> {
    // Html is !Send, keep it scoped.
    let doc = Html::parse_document(markup);
    let body_sel = Selector::parse(".result__body").expect("static selector");
    let title_sel = Selector::parse(".result__title").expect("static selector");
    let snippet_sel = Selector::parse(".result__snippet").expect("static selector");

    let mut hits = Vec::new();
    for result in doc.select(&body_sel) {
        let title = result
            .select(&title_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()));
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()));

        if let (Some(title), Some(snippet)) = (title, snippet) {
            if title.is_empty() || snippet.is_empty() {
                continue;
            }
            hits.push(SearchHit { title, snippet });
            if hits.len() >= limit {
                break;
            }
        }
    }

    hits
}

/// Render hits as the text block handed to the analysis step:
/// `Title: …` / `Snippet: …` lines per hit, blank line between hits.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("Title: {}\nSnippet: {}\n", hit.title, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ────────────────────────────────────────────────────────────────────
