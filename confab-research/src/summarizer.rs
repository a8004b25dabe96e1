//! Search-result summarizer

use crate::search::SearchResult;
use confab_core::{ConfabResult, GenerationOptions, Turn};
use confab_llm::InferenceProvider;
use std::sync::Arc;
use tracing::debug;

const SUMMARIZER_INSTRUCTIONS: &str = "\
You are a research assistant. Given a search result, produce a concise summary \
of 2-3 paragraphs capturing the main points relevant to the research question. \
Write in plain prose. Ignore navigation text, ads, and boilerplate. If the page \
text is empty, summarize from the title and snippet alone.";

/// Condenses a fetched search result into a short summary
pub struct Summarizer {
    llm: Arc<dyn InferenceProvider>,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn InferenceProvider>) -> Self {
        Self { llm }
    }

    pub async fn summarize(
        &self,
        research_question: &str,
        result: &SearchResult,
    ) -> ConfabResult<String> {
        debug!("Summarizing result: {}", result.url);

        let task = format!(
            "Research question: {}\n\nTitle: {}\nURL: {}\nSnippet: {}\n\nPage text:\n{}",
            research_question, result.title, result.url, result.snippet, result.content
        );

        let conversation = vec![Turn::system(SUMMARIZER_INSTRUCTIONS), Turn::user(task)];
        let options = GenerationOptions::default().with_temperature(0.3);

        let completion = self.llm.generate(conversation, &options).await?;
        Ok(completion.content)
    }
}
