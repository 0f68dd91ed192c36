//! Thin HTTP client for the DuckDuckGo HTML results endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use websift_config::SearchConfig;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Issues one GET per query against the configured HTML search endpoint and
/// returns the raw markup.  No retry, no caching; a transport failure or
/// non-2xx status is an error the caller records against the current row.
#[derive(Debug, Clone)]
pub struct SearchClient {
    base_url: String,
    client: reqwest::Client,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build search HTTP client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    /// Fetch the results page for `query`.  The query is URL-escaped by the
    /// request builder.
    pub async fn search(&self, query: &str) -> Result<String> {
        tracing::debug!(%query, "issuing web search");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("search request timed out")
                } else if e.is_connect() {
                    anyhow::anyhow!("search connection failed: {e}")
                } else {
                    anyhow::anyhow!("search request error: {e}")
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("search endpoint returned HTTP {status}");
        }

        resp.text()
            .await
            .context("failed to read search response body")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
