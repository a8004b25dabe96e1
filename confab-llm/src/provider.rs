//! Inference provider trait
//!
//! The orchestrator and the research agents depend on this trait rather than
//! a concrete client, so tests can substitute fakes.

use async_trait::async_trait;
use confab_core::{Completion, ConfabResult, GenerationOptions, Turn};

/// A capability that turns an ordered conversation into generated text plus
/// token-usage counters.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Generate a completion for the given conversation.
    ///
    /// Implementations fail on any transport or API error; no local retry.
    async fn generate(
        &self,
        conversation: Vec<Turn>,
        options: &GenerationOptions,
    ) -> ConfabResult<Completion>;
}
