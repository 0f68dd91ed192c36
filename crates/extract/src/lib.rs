//! LLM-backed structured extraction of search results.
//!
//! The entry point is [`Analyzer::analyze`]: given a query and the formatted
//! search-results text it returns an [`Analysis`] — always.  Transport
//! failures, quota errors, and garbage model output are folded into a
//! sentinel record rather than propagated, so one bad completion can never
//! abort a batch.

mod client;
mod prompt;

pub use client::{ChatClient, CompletionBackend};
pub use prompt::{SYSTEM_PROMPT, build_user_prompt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ── Analysis record ──────────────────────────────────────────────────────────

/// Structured summary extracted from one query's search results.
///
/// Every field is tolerant of absence: the model is *asked* for all five
/// keys, but a reply that drops some still parses, with the missing keys
/// becoming explicit `None`/empty values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Analysis {
    #[serde(default)]
    pub extracted_info: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Source reliability as reported by the model: high / medium / low,
    /// or `"error"` on the sentinel path.
    #[serde(default)]
    pub source_quality: Option<String>,
    /// Model confidence: high / medium / low, or `"none"` on the sentinel path.
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    /// Set only when analysis failed; the other fields then hold sentinel
    /// values.  Never set on a successful parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Analysis {
    /// The fixed record returned whenever the completion call or the parse of
    /// its reply fails.
    pub fn sentinel(cause: impl Into<String>) -> Self {
        Self {
            extracted_info: None,
            key_points: Vec::new(),
            source_quality: Some("error".to_string()),
            confidence: Some("none".to_string()),
            additional_notes: Some("Failed to process with LLM".to_string()),
            error: Some(cause.into()),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.error.is_some()
    }
}

// ── Analyzer ─────────────────────────────────────────────────────────────────

/// Turns a query plus formatted search results into an [`Analysis`].
///
/// Implementations must be infallible at the signature level: every failure
/// mode becomes a sentinel record.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, query: &str, results_text: &str) -> Analysis;
}

/// Production analyzer: prompts a chat-completion backend for JSON-only
/// output and parses the reply.
pub struct LlmAnalyzer<B> {
    backend: B,
}

impl<B: CompletionBackend> LlmAnalyzer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: CompletionBackend> Analyzer for LlmAnalyzer<B> {
    async fn analyze(&self, query: &str, results_text: &str) -> Analysis {
        let user = build_user_prompt(query, results_text);

        let reply = match self.backend.complete(SYSTEM_PROMPT, &user).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(%query, error = %e, "completion request failed");
                return Analysis::sentinel(format!("LLM processing error: {e}"));
            }
        };

        match recover_json::<Analysis>(&reply) {
            Some(mut analysis) => {
                // A model reply never carries the error field.
                analysis.error = None;
                analysis
            }
            None => {
                tracing::warn!(%query, "completion reply was not valid JSON");
                Analysis::sentinel("LLM processing error: response was not valid JSON")
            }
        }
    }
}

// ── JSON recovery ────────────────────────────────────────────────────────────

/// Recover a typed value from untrusted model text.
///
/// Tries a fenced ```json block first, then the span from the first `{` to
/// the last `}`.  Returns `None` when neither yields valid JSON.
pub fn recover_json<T: serde::de::DeserializeOwned>(response: &str) -> Option<T> {
    // Strategy 1: fenced ```json ... ``` blocks.
    if let Some(fence_start) = response.find("```json") {
        let after_fence = &response[fence_start + "```json".len()..];
        if let Some(json_start) = after_fence.find(|c: char| !c.is_whitespace()) {
            let json_body = &after_fence[json_start..];
            if let Some(fence_end) = json_body.find("```") {
                let json_str = json_body[..fence_end].trim();
                if let Ok(val) = serde_json::from_str(json_str) {
                    return Some(val);
                }
            }
        }
    }

    // Strategy 2: bare JSON object — first '{' to last '}'.
    let trimmed = response.trim();
    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if end > start {
                let candidate = &trimmed[start..=end];
                if let Ok(val) = serde_json::from_str(candidate) {
                    return Some(val);
                }
            }
        }
    }

    None
}

// ── Tests ────────────────────────────────────────────────────────────────────
