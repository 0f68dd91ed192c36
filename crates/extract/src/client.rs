//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use websift_config::LlmConfig;

/// Anything that can answer a (system, user) message pair with assistant
/// text.  The pipeline is tested against in-process implementations of this.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Production backend: POSTs to an OpenAI-compatible `/chat/completions`
/// endpoint with bearer auth.  Deterministic settings: `temperature` 0 and a
/// 1000-token output cap.
#[derive(Debug, Clone)]
pub struct ChatClient {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("no API key configured; set WEBSIFT_API_KEY or GROQ_API_KEY");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build completion HTTP client")?;

        Ok(Self {
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        })
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": 0,
            "max_tokens": 1000
        });

        tracing::debug!(model = %self.model, "issuing completion request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("completion request failed")?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .context("failed to read completion response")?;

        // Error bodies are not guaranteed to be JSON (a proxy 502 is HTML),
        // so keep the status and fall back to a body excerpt.
        if !status.is_success() {
            let detail = serde_json::from_str::<serde_json::Value>(&raw)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                        .map(ToString::to_string)
                })
                .unwrap_or_else(|| {
                    let trimmed = raw.trim();
                    if trimmed.is_empty() {
                        "no detail".to_string()
                    } else {
                        trimmed.chars().take(200).collect()
                    }
                });
            anyhow::bail!("completion endpoint returned {status}: {detail}");
        }

        let body: serde_json::Value =
            serde_json::from_str(&raw).context("completion response was not JSON")?;

        body.get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| anyhow::anyhow!("completion response missing message content: {body}"))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
