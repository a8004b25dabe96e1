//! Search planner
//!
//! Decomposes a research question into 3-6 focused web searches. The model
//! must answer with JSON matching a statically authored schema; anything
//! else is a schema error surfaced to the caller.

use confab_core::{ConfabError, ConfabResult, GenerationOptions, Turn};
use confab_llm::InferenceProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Bounds on a valid search plan
pub const MIN_SEARCHES: usize = 3;
pub const MAX_SEARCHES: usize = 6;
pub const MAX_QUERY_CHARS: usize = 100;

/// The schema text is authored here, next to the types it describes, rather
/// than derived from them at runtime.
const PLANNER_INSTRUCTIONS: &str = "\
You are an expert research strategist. Break the user's query into 3-6 DISTINCT web searches \
that collectively provide comprehensive coverage (definitions, recent data, opposing views, \
expert analyses, statistics).

Output MUST be valid JSON matching exactly this schema (no extra keys, no Markdown):
{
  \"searches\": [
    { \"query\": <string>, \"reason\": <string> }
  ]
}

Guidelines:
- Keep each `query` concise (at most 100 characters) and remove redundant phrasing.
- Start each `reason` with an action verb (e.g. 'Identify', 'Compare', 'Gather').
- Avoid overlap: each search should target a unique facet.
- Do NOT wrap the JSON in code fences. Return JSON only.";

/// Single search query plus motivation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchItem {
    /// The search query (at most 100 characters)
    pub query: String,
    /// Why this query advances the research goal
    pub reason: String,
}

/// A validated, bounded list of searches to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchPlan {
    pub searches: Vec<SearchItem>,
}

/// Produces a `SearchPlan` from a research question
pub struct Planner {
    llm: Arc<dyn InferenceProvider>,
}

impl Planner {
    pub fn new(llm: Arc<dyn InferenceProvider>) -> Self {
        Self { llm }
    }

    /// Plan the searches for a research question.
    ///
    /// A response that does not parse to the required shape is a
    /// `PlanSchema` error, never silently replaced with a default plan.
    pub async fn plan(&self, user_query: &str) -> ConfabResult<SearchPlan> {
        debug!("Planning searches for query: {}", user_query);

        let conversation = vec![
            Turn::system(PLANNER_INSTRUCTIONS),
            Turn::user(user_query.to_string()),
        ];

        // Conservative temperature for structured output
        let options = GenerationOptions::default().with_temperature(0.3);
        let completion = self.llm.generate(conversation, &options).await?;

        let plan = Self::parse_plan(&completion.content)?;
        info!("Planned {} searches", plan.searches.len());
        Ok(plan)
    }

    /// Parse and validate a model response against the plan schema
    pub fn parse_plan(raw: &str) -> ConfabResult<SearchPlan> {
        let plan: SearchPlan = serde_json::from_str(raw.trim()).map_err(|e| {
            ConfabError::PlanSchema(format!("Response is not valid plan JSON: {}", e))
        })?;

        Self::validate(&plan)?;
        Ok(plan)
    }

    fn validate(plan: &SearchPlan) -> ConfabResult<()> {
        let count = plan.searches.len();
        if !(MIN_SEARCHES..=MAX_SEARCHES).contains(&count) {
            return Err(ConfabError::PlanSchema(format!(
                "Plan must contain {} to {} searches, got {}",
                MIN_SEARCHES, MAX_SEARCHES, count
            )));
        }

        let mut seen = HashSet::new();
        for item in &plan.searches {
            let query = item.query.trim();
            if query.is_empty() {
                return Err(ConfabError::PlanSchema("Empty search query".to_string()));
            }

            let chars = item.query.chars().count();
            if chars > MAX_QUERY_CHARS {
                return Err(ConfabError::PlanSchema(format!(
                    "Search query exceeds {} characters ({}): {}",
                    MAX_QUERY_CHARS, chars, item.query
                )));
            }

            if !seen.insert(query.to_lowercase()) {
                return Err(ConfabError::PlanSchema(format!(
                    "Duplicate search query: {}",
                    item.query
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use confab_core::{Completion, TokenUsage};

    struct CannedProvider {
        response: String,
    }

    #[async_trait]
    impl InferenceProvider for CannedProvider {
        async fn generate(
            &self,
            _conversation: Vec<Turn>,
            _options: &GenerationOptions,
        ) -> ConfabResult<Completion> {
            Ok(Completion {
                content: self.response.clone(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn plan_json(queries: &[&str]) -> String {
        let searches: Vec<serde_json::Value> = queries
            .iter()
            .map(|q| serde_json::json!({"query": q, "reason": format!("Gather data on {}", q)}))
            .collect();
        serde_json::json!({ "searches": searches }).to_string()
    }

    #[tokio::test]
    async fn test_valid_plan_parses() {
        let provider = Arc::new(CannedProvider {
            response: plan_json(&[
                "remote work urban housing prices",
                "office vacancy rates 2024",
                "city migration patterns remote workers",
            ]),
        });

        let plan = Planner::new(provider)
            .plan("impact of remote work on urban housing")
            .await
            .unwrap();

        assert_eq!(plan.searches.len(), 3);
        assert!(plan.searches.iter().all(|s| s.query.chars().count() <= 100));
    }

    #[test]
    fn test_too_few_searches_rejected() {
        let err = Planner::parse_plan(&plan_json(&["a", "b"])).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_too_many_searches_rejected() {
        let err =
            Planner::parse_plan(&plan_json(&["a", "b", "c", "d", "e", "f", "g"])).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_overlong_query_rejected() {
        let long = "x".repeat(101);
        let err = Planner::parse_plan(&plan_json(&[&long, "b", "c"])).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_duplicate_queries_rejected() {
        let err = Planner::parse_plan(&plan_json(&["same", "same", "other"])).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_markdown_fenced_response_rejected() {
        let fenced = format!("```json\n{}\n```", plan_json(&["a", "b", "c"]));
        let err = Planner::parse_plan(&fenced).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_prose_response_rejected() {
        let err = Planner::parse_plan("Sure! Here are some searches you could run.").unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let extra_top = r#"{"searches": [
            {"query": "a", "reason": "Gather"},
            {"query": "b", "reason": "Gather"},
            {"query": "c", "reason": "Gather"}
        ], "notes": "bonus"}"#;
        let err = Planner::parse_plan(extra_top).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));

        let extra_item = r#"{"searches": [
            {"query": "a", "reason": "Gather", "priority": 1},
            {"query": "b", "reason": "Gather"},
            {"query": "c", "reason": "Gather"}
        ]}"#;
        let err = Planner::parse_plan(extra_item).unwrap_err();
        assert!(matches!(err, ConfabError::PlanSchema(_)));
    }

    #[test]
    fn test_exactly_six_searches_accepted() {
        let plan = Planner::parse_plan(&plan_json(&["a", "b", "c", "d", "e", "f"])).unwrap();
        assert_eq!(plan.searches.len(), 6);
    }
}
