//! Research pipeline manager
//!
//! Runs plan -> search -> summarize -> write -> email as one pipeline. A
//! failed search or summary for a single query is skipped with a warning;
//! planner and writer failures abort the run.

use crate::email::EmailComposer;
use crate::planner::{Planner, SearchPlan};
use crate::search::SearchProvider;
use crate::summarizer::Summarizer;
use crate::writer::ReportWriter;
use confab_core::ConfabResult;
use confab_llm::InferenceProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Output of a full research run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub query: String,
    pub plan: SearchPlan,
    pub summaries: Vec<String>,
    pub report: String,
    pub email: String,
}

/// Drives the deep-research pipeline end to end
pub struct ResearchManager {
    planner: Planner,
    search: Arc<dyn SearchProvider>,
    summarizer: Summarizer,
    writer: ReportWriter,
    email: EmailComposer,
}

impl ResearchManager {
    pub fn new(llm: Arc<dyn InferenceProvider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            planner: Planner::new(llm.clone()),
            search,
            summarizer: Summarizer::new(llm.clone()),
            writer: ReportWriter::new(llm.clone()),
            email: EmailComposer::new(llm),
        }
    }

    pub async fn run(&self, query: &str) -> ConfabResult<ResearchReport> {
        info!("Starting research run for: {}", query);

        let plan = self.planner.plan(query).await?;
        info!("Plan ready with {} searches", plan.searches.len());

        let mut summaries = Vec::new();
        for item in &plan.searches {
            let results = match self.search.search(&item.query).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Search failed for '{}': {}", item.query, e);
                    continue;
                }
            };

            for result in &results {
                match self.summarizer.summarize(query, result).await {
                    Ok(summary) => summaries.push(summary),
                    Err(e) => warn!("Summarization failed for {}: {}", result.url, e),
                }
            }
        }

        info!("Collected {} summaries", summaries.len());

        let report = self.writer.write(query, &summaries).await?;
        let email = self.email.compose(&report).await?;

        info!("Research run completed for: {}", query);

        Ok(ResearchReport {
            query: query.to_string(),
            plan,
            summaries,
            report,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchResult;
    use async_trait::async_trait;
    use confab_core::{Completion, ConfabError, GenerationOptions, TokenUsage, Turn};
    use std::sync::Mutex;

    /// Provider fake that replays scripted responses in order
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<&str>) -> Self {
            let mut responses: Vec<String> = responses.into_iter().map(String::from).collect();
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl InferenceProvider for ScriptedProvider {
        async fn generate(
            &self,
            _conversation: Vec<Turn>,
            _options: &GenerationOptions,
        ) -> ConfabResult<Completion> {
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ConfabError::Llm("script exhausted".to_string()))?;
            Ok(Completion {
                content,
                usage: TokenUsage::default(),
            })
        }
    }

    struct FakeSearch;

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, query: &str) -> ConfabResult<Vec<SearchResult>> {
            Ok(vec![SearchResult {
                title: format!("result for {}", query),
                url: "https://example.com".to_string(),
                snippet: "a snippet".to_string(),
                content: "page text".to_string(),
            }])
        }
    }

    fn plan_response() -> &'static str {
        r#"{"searches": [
            {"query": "q1", "reason": "Identify background"},
            {"query": "q2", "reason": "Gather statistics"},
            {"query": "q3", "reason": "Compare viewpoints"}
        ]}"#
    }

    #[tokio::test]
    async fn test_pipeline_produces_report_and_email() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            plan_response(),
            "summary 1",
            "summary 2",
            "summary 3",
            "the report",
            "the email",
        ]));

        let manager = ResearchManager::new(provider, Arc::new(FakeSearch));
        let outcome = manager.run("some topic").await.unwrap();

        assert_eq!(outcome.plan.searches.len(), 3);
        assert_eq!(outcome.summaries.len(), 3);
        assert_eq!(outcome.report, "the report");
        assert_eq!(outcome.email, "the email");
    }

    #[tokio::test]
    async fn test_bad_plan_aborts_run() {
        let provider = Arc::new(ScriptedProvider::new(vec!["not json"]));
        let manager = ResearchManager::new(provider, Arc::new(FakeSearch));

        let err = manager.run("topic").await.unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    struct BrokenSearch;

    #[async_trait]
    impl SearchProvider for BrokenSearch {
        async fn search(&self, _query: &str) -> ConfabResult<Vec<SearchResult>> {
            Err(ConfabError::Search("backend down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_search_failures_are_skipped_not_fatal() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            plan_response(),
            "the report",
            "the email",
        ]));

        let manager = ResearchManager::new(provider, Arc::new(BrokenSearch));
        let outcome = manager.run("topic").await.unwrap();

        assert!(outcome.summaries.is_empty());
        assert_eq!(outcome.report, "the report");
    }
}
