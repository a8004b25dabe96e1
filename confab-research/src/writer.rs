//! Report writer

use confab_core::{ConfabResult, GenerationOptions, Turn};
use confab_llm::InferenceProvider;
use std::sync::Arc;
use tracing::debug;

const WRITER_INSTRUCTIONS: &str = "\
You are a senior researcher writing a cohesive report. You will receive the \
original research question and a set of summaries gathered from web searches. \
Synthesize them into a well-structured markdown report with an executive \
summary, thematic sections, and a conclusion. Aim for depth over breadth and \
note where sources disagree.";

/// Synthesizes search summaries into a long-form report
pub struct ReportWriter {
    llm: Arc<dyn InferenceProvider>,
}

impl ReportWriter {
    pub fn new(llm: Arc<dyn InferenceProvider>) -> Self {
        Self { llm }
    }

    pub async fn write(&self, research_question: &str, summaries: &[String]) -> ConfabResult<String> {
        debug!("Writing report from {} summaries", summaries.len());

        let mut task = format!("Research question: {}\n\nSummaries:\n", research_question);
        for (i, summary) in summaries.iter().enumerate() {
            task.push_str(&format!("\n--- Summary {} ---\n{}\n", i + 1, summary));
        }

        let conversation = vec![Turn::system(WRITER_INSTRUCTIONS), Turn::user(task)];
        let options = GenerationOptions::default().with_max_tokens(4000);

        let completion = self.llm.generate(conversation, &options).await?;
        Ok(completion.content)
    }
}
