//! Application state
//!
//! The inference client and the conversation store are constructed here and
//! passed into the orchestrator explicitly, so tests can substitute fakes.

use crate::{WebConfig, WebError, WebResult};
use confab_chat::ChatOrchestrator;
use confab_core::LlmConfig;
use confab_llm::{ConfabLlmClient, InferenceProvider};
use confab_store::ConversationStore;
use std::sync::Arc;
use tracing::info;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Inference provider handle
    pub llm: Arc<dyn InferenceProvider>,
    /// Conversation store handle
    pub store: Arc<ConversationStore>,
    /// Chat orchestrator
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    /// Create application state with the real inference client and store
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let llm: Arc<dyn InferenceProvider> = Arc::new(ConfabLlmClient::new(LlmConfig::from_env()));

        let store = ConversationStore::new(&config.database_url)
            .await
            .map_err(|e| WebError::Storage(format!("Failed to open conversation store: {}", e)))?;

        let state = Self::with_components(config, llm, Arc::new(store));
        info!("Application state initialized");
        Ok(state)
    }

    /// Build state from pre-constructed components. Used by tests to inject
    /// fake providers.
    pub fn with_components(
        config: WebConfig,
        llm: Arc<dyn InferenceProvider>,
        store: Arc<ConversationStore>,
    ) -> Self {
        let orchestrator = Arc::new(ChatOrchestrator::new(llm.clone(), store.clone()));
        Self {
            config,
            llm,
            store,
            orchestrator,
        }
    }
}
