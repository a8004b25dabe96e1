//! Email composer

use confab_core::{ConfabResult, GenerationOptions, Turn};
use confab_llm::InferenceProvider;
use std::sync::Arc;
use tracing::debug;

const EMAIL_INSTRUCTIONS: &str = "\
You are an email composer. Given a report, compose a professional email that \
summarizes the key findings and includes the full report. The email should \
include a clear subject line, a greeting, an executive summary, key findings, \
and a professional closing.";

/// Composes an email presenting a research report
pub struct EmailComposer {
    llm: Arc<dyn InferenceProvider>,
}

impl EmailComposer {
    pub fn new(llm: Arc<dyn InferenceProvider>) -> Self {
        Self { llm }
    }

    pub async fn compose(&self, report: &str) -> ConfabResult<String> {
        debug!("Composing email for report ({} chars)", report.len());

        let conversation = vec![
            Turn::system(EMAIL_INSTRUCTIONS),
            Turn::user(report.to_string()),
        ];
        let options = GenerationOptions::default().with_temperature(0.5);

        let completion = self.llm.generate(conversation, &options).await?;
        Ok(completion.content)
    }
}
