//! Configuration loaded from environment variables

use serde::{Deserialize, Serialize};

/// Inference API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key (optional for local endpoints)
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Default temperature for generation
    pub temperature: f32,
    /// Default maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("CONFAB_LLM_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("CONFAB_LLM_MODEL").unwrap_or(defaults.model),
            temperature: std::env::var("CONFAB_LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: std::env::var("CONFAB_LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
        }
    }
}

/// Search backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// SerpAPI key
    pub api_key: Option<String>,
    /// Maximum number of result listings per query
    pub max_results: usize,
    /// Per-page fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Maximum characters of page text kept for summarization
    pub max_content_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: 5,
            fetch_timeout_secs: 10,
            max_content_chars: 2000,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("SERPAPI_API_KEY").ok(),
            max_results: std::env::var("CONFAB_SEARCH_MAX_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_results),
            fetch_timeout_secs: defaults.fetch_timeout_secs,
            max_content_chars: defaults.max_content_chars,
        }
    }
}
