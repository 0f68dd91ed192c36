use std::env;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Search config ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the search engine's HTML results endpoint.
    pub base_url: String,
    /// Maximum (title, snippet) hits kept per query.
    pub max_hits: usize,
    /// Timeout applied to the search request, in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com/html/".to_string(),
            max_hits: 3,
            timeout_secs: 30,
        }
    }
}

// ── LLM config ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub api_url: String,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Timeout applied to completion requests, in seconds.
    pub timeout_secs: u64,
    /// API credential.  Never read from or written to the config file —
    /// populated from `WEBSIFT_API_KEY` or `GROQ_API_KEY` at load time.
    #[serde(skip)]
    pub api_key: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "mixtral-8x7b-32768".to_string(),
            timeout_secs: 30,
            api_key: String::new(),
        }
    }
}

// ── Pipeline config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fixed pause after each processed row, in seconds.  `0` disables the
    /// pause entirely.
    pub delay_secs: u64,
    /// Search template applied when the user does not supply one.  Must
    /// contain the `{entity}` placeholder.
    pub default_template: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_secs: 2,
            default_template: "Latest developments and news about {entity}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }

        // Credential only ever comes from the environment.
        // WEBSIFT_API_KEY takes precedence over the provider-native name.
        for var in ["WEBSIFT_API_KEY", "GROQ_API_KEY"] {
            if let Ok(key) = env::var(var) {
                if !key.trim().is_empty() {
                    config.llm.api_key = key;
                    break;
                }
            }
        }

        if let Ok(model) = env::var("WEBSIFT_MODEL") {
            if !model.trim().is_empty() {
                config.llm.model = model;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        !self.llm.api_key.trim().is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
