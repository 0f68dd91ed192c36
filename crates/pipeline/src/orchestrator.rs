//! Row-by-row pipeline driver.
//!
//! Rows are processed strictly sequentially; the fixed inter-row pause is the
//! pipeline's whole concurrency budget against the two external services.
//! A fault inside a row becomes that row's `error` — it never unwinds the
//! batch.  The only fatal error is a bad template, rejected before row 0.

use anyhow::Result;
use async_trait::async_trait;

use websift_extract::Analyzer;
use websift_search::{SearchClient, extract_hits, format_hits, render_query};

use crate::model::{EntityResult, EntityRow};
use crate::throttle::Throttle;

// ── Seams ────────────────────────────────────────────────────────────────────

/// Fetches raw result markup for a rendered query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

#[async_trait]
impl SearchProvider for SearchClient {
    async fn search(&self, query: &str) -> Result<String> {
        SearchClient::search(self, query).await
    }
}

/// Observer invoked after every row with `(rows_done, rows_total)`.
pub trait Progress: Send + Sync {
    fn on_row(&self, done: usize, total: usize);
}

impl<F: Fn(usize, usize) + Send + Sync> Progress for F {
    fn on_row(&self, done: usize, total: usize) {
        self(done, total)
    }
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

pub struct Pipeline<S, A> {
    search: S,
    analyzer: A,
    max_hits: usize,
    throttle: Throttle,
}

impl<S: SearchProvider, A: Analyzer> Pipeline<S, A> {
    pub fn new(search: S, analyzer: A, max_hits: usize, throttle: Throttle) -> Self {
        Self {
            search,
            analyzer,
            max_hits,
            throttle,
        }
    }

    /// Enrich every row, in order.  Returns exactly `rows.len()` results.
    ///
    /// Fails only when `template` is malformed; that is checked before any
    /// row is touched.
    pub async fn run(
        &self,
        rows: &[EntityRow],
        template: &str,
        progress: &dyn Progress,
    ) -> Result<Vec<EntityResult>> {
        // Template problems are configuration errors; reject up front rather
        // than emitting one identical row error per entity.
        render_query(template, "probe")?;

        let total = rows.len();
        let mut results = Vec::with_capacity(total);

        for (idx, row) in rows.iter().enumerate() {
            tracing::info!(entity = %row.entity, row = idx + 1, total, "processing row");
            let result = self.process_row(row, template).await;
            if let Some(error) = &result.error {
                tracing::warn!(entity = %row.entity, %error, "row failed");
            }
            results.push(result);

            progress.on_row(idx + 1, total);
            self.throttle.pause().await;
        }

        Ok(results)
    }

    async fn process_row(&self, row: &EntityRow, template: &str) -> EntityResult {
        // Cannot fail after the up-front probe, but render per row anyway so
        // the recorded query always matches this entity.
        let query = match render_query(template, &row.entity) {
            Ok(query) => query,
            Err(e) => return EntityResult::failed(row.entity.clone(), None, e.to_string()),
        };

        let markup = match self.search.search(&query).await {
            Ok(markup) => markup,
            Err(e) => {
                return EntityResult::failed(row.entity.clone(), Some(query), e.to_string());
            }
        };

        let hits = extract_hits(&markup, self.max_hits);
        tracing::debug!(entity = %row.entity, hits = hits.len(), "extracted hits");

        // The analyzer is infallible: bad model output becomes a sentinel
        // analysis, which is still a completed row.
        let analysis = self.analyzer.analyze(&query, &format_hits(&hits)).await;

        EntityResult::completed(row.entity.clone(), query, analysis)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use websift_extract::Analysis;

    fn rows(entities: &[&str]) -> Vec<EntityRow> {
        entities.iter().map(|e| EntityRow::new(*e)).collect()
    }

    fn hit_page(hits: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (title, snippet) in hits {
            body.push_str(&format!(
                r#"<div class="result__body">
                     <h2 class="result__title">{title}</h2>
                     <a class="result__snippet">{snippet}</a>
                   </div>"#
            ));
        }
        format!("<html><body>{body}</body></html>")
    }

    /// Search mock: per-entity canned markup, errors for entities in `fail`.
    struct MockSearch {
        pages: Vec<(&'static str, String)>,
        fail: Vec<&'static str>,
    }

    #[async_trait]
    impl SearchProvider for MockSearch {
        async fn search(&self, query: &str) -> Result<String> {
            if self.fail.iter().any(|e| query.contains(e)) {
                anyhow::bail!("search connection failed: simulated");
            }
            for (entity, page) in &self.pages {
                if query.contains(entity) {
                    return Ok(page.clone());
                }
            }
            Ok("<html><body></body></html>".to_string())
        }
    }

    /// Analyzer mock: replays canned replies per entity through the real
    /// JSON-recovery path.
    struct MockAnalyzer {
        replies: Vec<(&'static str, &'static str)>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl MockAnalyzer {
        fn new(replies: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                replies,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Analyzer for MockAnalyzer {
        async fn analyze(&self, query: &str, results_text: &str) -> Analysis {
            self.seen
                .lock()
                .unwrap()
                .push((query.to_string(), results_text.to_string()));
            let reply = self
                .replies
                .iter()
                .find(|(entity, _)| query.contains(entity))
                .map(|(_, reply)| *reply)
                .unwrap_or("{}");
            websift_extract::recover_json::<Analysis>(reply)
                .map(|mut a| {
                    a.error = None;
                    a
                })
                .unwrap_or_else(|| Analysis::sentinel("mock: reply was not valid JSON"))
        }
    }

    fn pipeline(search: MockSearch, analyzer: MockAnalyzer) -> Pipeline<MockSearch, MockAnalyzer> {
        Pipeline::new(search, analyzer, 3, Throttle::from_secs(0))
    }

    fn no_progress() -> impl Progress {
        |_done: usize, _total: usize| {}
    }

    const VALID_REPLY: &str = r#"{"extracted_info":"found","key_points":["a"],"source_quality":"high","confidence":"medium","additional_notes":""}"#;

    #[tokio::test]
    async fn output_length_and_order_match_input() {
        let p = pipeline(
            MockSearch {
                pages: vec![],
                fail: vec![],
            },
            MockAnalyzer::new(vec![]),
        );
        let input = rows(&["Acme", "Globex", "Initech"]);
        let results = p
            .run(&input, "News about {entity}", &no_progress())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        let entities: Vec<_> = results.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, ["Acme", "Globex", "Initech"]);
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let p = pipeline(
            MockSearch {
                pages: vec![],
                fail: vec![],
            },
            MockAnalyzer::new(vec![]),
        );
        let results = p.run(&[], "q {entity}", &no_progress()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn bad_template_aborts_before_any_row() {
        let p = pipeline(
            MockSearch {
                pages: vec![],
                fail: vec![],
            },
            MockAnalyzer::new(vec![]),
        );
        let err = p
            .run(&rows(&["Acme"]), "no placeholder here", &no_progress())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
        assert!(p.analyzer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_failure_isolates_to_its_row() {
        let p = pipeline(
            MockSearch {
                pages: vec![("Acme", hit_page(&[("t", "s")]))],
                fail: vec!["Globex"],
            },
            MockAnalyzer::new(vec![("Acme", VALID_REPLY)]),
        );
        let results = p
            .run(&rows(&["Acme", "Globex", "Initech"]), "about {entity}", &no_progress())
            .await
            .unwrap();

        assert!(results[0].analysis.is_some());
        assert!(results[0].error.is_none());

        assert!(results[1].analysis.is_none());
        assert!(results[1].error.as_deref().unwrap().contains("simulated"));
        assert_eq!(results[1].search_query.as_deref(), Some("about Globex"));

        // The row after the failure is unaffected.
        assert!(results[2].analysis.is_some());
    }

    #[tokio::test]
    async fn progress_reported_after_every_row() {
        let p = pipeline(
            MockSearch {
                pages: vec![],
                fail: vec!["B"],
            },
            MockAnalyzer::new(vec![]),
        );
        let seen = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| {
            seen.lock().unwrap().push((done, total));
        };
        p.run(&rows(&["A", "B"]), "q {entity}", &progress)
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_runs_after_failed_rows_too() {
        let p = Pipeline::new(
            MockSearch {
                pages: vec![],
                fail: vec!["A", "B"],
            },
            MockAnalyzer::new(vec![]),
            3,
            Throttle::from_secs(2),
        );
        let start = tokio::time::Instant::now();
        p.run(&rows(&["A", "B"]), "q {entity}", &no_progress())
            .await
            .unwrap();
        // One 2 s pause per row, including failed ones.
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn analyzer_receives_formatted_hits() {
        let p = pipeline(
            MockSearch {
                pages: vec![("Acme", hit_page(&[("Launch", "Acme launched a thing")]))],
                fail: vec![],
            },
            MockAnalyzer::new(vec![("Acme", VALID_REPLY)]),
        );
        p.run(&rows(&["Acme"]), "about {entity}", &no_progress())
            .await
            .unwrap();
        let seen = p.analyzer.seen.lock().unwrap();
        assert_eq!(seen[0].0, "about Acme");
        assert_eq!(seen[0].1, "Title: Launch\nSnippet: Acme launched a thing\n");
    }

    /// The end-to-end scenario: Acme gets hits and valid JSON, Globex gets an
    /// empty result page and a non-JSON reply.
    #[tokio::test]
    async fn mixed_batch_end_to_end() {
        let p = pipeline(
            MockSearch {
                pages: vec![(
                    "Acme",
                    hit_page(&[("Acme news", "snippet one"), ("More Acme", "snippet two")]),
                )],
                fail: vec![],
            },
            MockAnalyzer::new(vec![
                ("Acme", VALID_REPLY),
                ("Globex", "Sorry, nothing to report."),
            ]),
        );
        let results = p
            .run(
                &rows(&["Acme", "Globex"]),
                "Latest news about {entity}",
                &no_progress(),
            )
            .await
            .unwrap();

        let acme = results[0].analysis.as_ref().unwrap();
        assert!(matches!(
            acme.source_quality.as_deref(),
            Some("high") | Some("medium") | Some("low")
        ));
        assert!(acme.error.is_none());

        let globex = results[1].analysis.as_ref().unwrap();
        assert_eq!(globex.source_quality.as_deref(), Some("error"));
        assert_eq!(globex.confidence.as_deref(), Some("none"));
        assert!(globex.key_points.is_empty());

        assert_eq!(results[0].search_query.as_deref(), Some("Latest news about Acme"));
        assert_eq!(results[1].search_query.as_deref(), Some("Latest news about Globex"));
        assert!(!results[0].timestamp.is_empty());
        assert!(!results[1].timestamp.is_empty());
    }
}
