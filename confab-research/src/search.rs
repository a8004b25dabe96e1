//! Web search and page fetching
//!
//! Retrieves result listings via SerpAPI and fetches page text for
//! downstream summarization. Fetched HTML is stripped to plain text and
//! truncated; a slow or failing page yields empty content rather than
//! aborting the search.

use async_trait::async_trait;
use confab_core::{ConfabError, ConfabResult, SearchConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A single search result with fetched page text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Stripped page text, truncated to the configured limit. Empty when
    /// the fetch failed or timed out.
    pub content: String,
}

/// A capability that resolves a query to result listings with page text
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> ConfabResult<Vec<SearchResult>>;
}

/// SerpAPI-backed search provider
#[derive(Debug)]
pub struct SerpApiSearch {
    http: reqwest::Client,
    config: SearchConfig,
    tag_pattern: Regex,
    noise_pattern: Regex,
}

#[derive(Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
}

#[derive(Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerpApiSearch {
    pub fn new(config: SearchConfig) -> ConfabResult<Self> {
        if config.api_key.is_none() {
            return Err(ConfabError::Config(
                "SERPAPI_API_KEY not set; no search backend available".to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            // Script/style blocks go first so their bodies disappear too
            noise_pattern: Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>")
                .expect("static regex"),
            tag_pattern: Regex::new(r"(?s)<[^>]*>").expect("static regex"),
        })
    }

    /// Strip tags from an HTML document and collapse whitespace
    pub fn strip_html(&self, html: &str) -> String {
        let without_noise = self.noise_pattern.replace_all(html, " ");
        let without_tags = self.tag_pattern.replace_all(&without_noise, " ");
        without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn truncate(text: &str, max_chars: usize) -> String {
        text.chars().take(max_chars).collect()
    }

    async fn fetch_content(&self, url: &str) -> String {
        if url.is_empty() {
            return String::new();
        }

        let request = self
            .http
            .get(url)
            .header("User-Agent", "Mozilla/5.0 (compatible; ConfabResearch/0.1)")
            .timeout(Duration::from_secs(self.config.fetch_timeout_secs));

        match request.send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(html) => {
                    let text = self.strip_html(&html);
                    Self::truncate(&text, self.config.max_content_chars)
                }
                Err(e) => {
                    warn!("Failed to read page body from {}: {}", url, e);
                    String::new()
                }
            },
            Ok(response) => {
                debug!("Page fetch for {} returned {}", url, response.status());
                String::new()
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    async fn search(&self, query: &str) -> ConfabResult<Vec<SearchResult>> {
        debug!("Searching for: {}", query);

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ConfabError::Config("Search API key missing".to_string()))?;

        let url = format!(
            "https://serpapi.com/search?engine=google&q={}&num={}&api_key={}",
            urlencoding::encode(query),
            self.config.max_results,
            api_key
        );

        let response: SerpApiResponse = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ConfabError::Search(format!("Search request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| ConfabError::Search(format!("Malformed search response: {}", e)))?;

        let mut results = Vec::new();
        for item in response
            .organic_results
            .into_iter()
            .take(self.config.max_results)
        {
            let content = self.fetch_content(&item.link).await;
            results.push(SearchResult {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
                content,
            });
        }

        debug!("Search returned {} results", results.len());
        Ok(results)
    }
}
