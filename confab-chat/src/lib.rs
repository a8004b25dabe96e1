//! Chat orchestration for the Confab service
//!
//! Composes a session's prior messages with caller-supplied context and the
//! new user message, invokes the inference provider, and appends the
//! resulting exchange to the conversation store.

use chrono::{DateTime, Utc};
use confab_core::{ConfabResult, ConversationLog, GenerationOptions, Message, Role, TokenUsage, Turn};
use confab_llm::InferenceProvider;
use confab_store::ConversationStore;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// How many prior stored messages are replayed into each inference call
pub const HISTORY_WINDOW: usize = 10;

/// Input for one chat exchange
#[derive(Debug, Clone, Default)]
pub struct ChatPrompt {
    pub message: String,
    pub session_id: Option<String>,
    pub context: Option<Vec<Turn>>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatPrompt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Outcome of one chat exchange
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub usage: TokenUsage,
}

/// Orchestrates a single chat request against the provider and the store.
///
/// Both collaborators are injected so tests can substitute fakes. No
/// cross-request locking: two concurrent requests for the same session may
/// interleave their reads and appends.
pub struct ChatOrchestrator {
    llm: Arc<dyn InferenceProvider>,
    store: Arc<ConversationStore>,
}

impl ChatOrchestrator {
    pub fn new(llm: Arc<dyn InferenceProvider>, store: Arc<ConversationStore>) -> Self {
        Self { llm, store }
    }

    /// Process one chat message and return the assistant's reply.
    ///
    /// The stored log is only written after a successful inference call, so
    /// a failed request leaves no partial state.
    pub async fn process(&self, prompt: ChatPrompt) -> ConfabResult<ChatReply> {
        let session_id = prompt
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let conversation = self.assemble_conversation(&prompt, &session_id).await?;

        debug!(
            "Assembled {} turns for session {}",
            conversation.len(),
            session_id
        );

        let options = GenerationOptions {
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
            model: None,
        };

        let completion = self.llm.generate(conversation, &options).await?;

        let now = Utc::now();
        let user_message = Message::new(Role::User, prompt.message, now);
        let assistant_message = Message::new(Role::Assistant, completion.content.clone(), now);

        self.store
            .append_exchange(&session_id, &user_message, &assistant_message)
            .await?;

        info!("Chat exchange completed for session {}", session_id);

        Ok(ChatReply {
            response: completion.content,
            session_id,
            timestamp: now,
            usage: completion.usage,
        })
    }

    /// Retrieve the full stored history of a session. `None` means the
    /// session was never used.
    pub async fn get_history(&self, session_id: &str) -> ConfabResult<Option<ConversationLog>> {
        self.store.get_log(session_id).await
    }

    /// Build the conversation sent to inference, in this exact order:
    /// caller system prompt, the most recent stored messages oldest-first,
    /// caller context pairs, then the new user message.
    async fn assemble_conversation(
        &self,
        prompt: &ChatPrompt,
        session_id: &str,
    ) -> ConfabResult<Vec<Turn>> {
        let mut conversation = Vec::new();

        if let Some(system_prompt) = &prompt.system_prompt {
            conversation.push(Turn::system(system_prompt.clone()));
        }

        let history = self.store.recent_messages(session_id, HISTORY_WINDOW).await?;
        conversation.extend(history.iter().map(Message::to_turn));

        if let Some(context) = &prompt.context {
            conversation.extend(context.iter().cloned());
        }

        conversation.push(Turn::user(prompt.message.clone()));
        Ok(conversation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use confab_core::{Completion, ConfabError};
    use std::sync::Mutex;

    /// Provider fake that records every conversation it receives
    struct RecordingProvider {
        reply: String,
        conversations: Mutex<Vec<Vec<Turn>>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                conversations: Mutex::new(Vec::new()),
            }
        }

        fn last_conversation(&self) -> Vec<Turn> {
            self.conversations.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl InferenceProvider for RecordingProvider {
        async fn generate(
            &self,
            conversation: Vec<Turn>,
            _options: &GenerationOptions,
        ) -> ConfabResult<Completion> {
            self.conversations.lock().unwrap().push(conversation);
            Ok(Completion {
                content: self.reply.clone(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                },
            })
        }
    }

    /// Provider fake that always fails
    struct FailingProvider;

    #[async_trait]
    impl InferenceProvider for FailingProvider {
        async fn generate(
            &self,
            _conversation: Vec<Turn>,
            _options: &GenerationOptions,
        ) -> ConfabResult<Completion> {
            Err(ConfabError::Llm("upstream unavailable".to_string()))
        }
    }

    async fn orchestrator_with(
        provider: Arc<dyn InferenceProvider>,
    ) -> (ChatOrchestrator, Arc<ConversationStore>) {
        let store = Arc::new(ConversationStore::new("sqlite::memory:").await.unwrap());
        (ChatOrchestrator::new(provider, store.clone()), store)
    }

    #[tokio::test]
    async fn test_fresh_session_id_generated_and_echoed() {
        let provider = Arc::new(RecordingProvider::new("hello back"));
        let (orchestrator, _) = orchestrator_with(provider.clone()).await;

        let reply = orchestrator.process(ChatPrompt::new("Hello")).await.unwrap();

        assert!(!reply.session_id.is_empty());
        assert_eq!(reply.response, "hello back");
        assert_eq!(reply.usage.total_tokens, 15);

        let log = orchestrator
            .get_history(&reply.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.messages.len(), 2);
        assert_eq!(log.messages[0].role, Role::User);
        assert_eq!(log.messages[0].content, "Hello");
        assert_eq!(log.messages[1].role, Role::Assistant);
        assert_eq!(log.messages[1].content, "hello back");
    }

    #[tokio::test]
    async fn test_supplied_session_id_is_used() {
        let provider = Arc::new(RecordingProvider::new("ok"));
        let (orchestrator, _) = orchestrator_with(provider).await;

        let mut prompt = ChatPrompt::new("hi");
        prompt.session_id = Some("my-session".to_string());

        let reply = orchestrator.process(prompt).await.unwrap();
        assert_eq!(reply.session_id, "my-session");
    }

    #[tokio::test]
    async fn test_conversation_assembly_order() {
        let provider = Arc::new(RecordingProvider::new("ok"));
        let (orchestrator, _) = orchestrator_with(provider.clone()).await;

        // Seed two exchanges of history
        for text in ["one", "two"] {
            let mut prompt = ChatPrompt::new(text);
            prompt.session_id = Some("s".to_string());
            orchestrator.process(prompt).await.unwrap();
        }

        let mut prompt = ChatPrompt::new("three");
        prompt.session_id = Some("s".to_string());
        prompt.system_prompt = Some("be terse".to_string());
        prompt.context = Some(vec![
            Turn::user("ctx question"),
            Turn::assistant("ctx answer"),
        ]);
        orchestrator.process(prompt).await.unwrap();

        let conversation = provider.last_conversation();
        let expected: Vec<(Role, &str)> = vec![
            (Role::System, "be terse"),
            (Role::User, "one"),
            (Role::Assistant, "ok"),
            (Role::User, "two"),
            (Role::Assistant, "ok"),
            (Role::User, "ctx question"),
            (Role::Assistant, "ctx answer"),
            (Role::User, "three"),
        ];

        assert_eq!(conversation.len(), expected.len());
        for (turn, (role, content)) in conversation.iter().zip(expected) {
            assert_eq!(turn.role, role);
            assert_eq!(turn.content, content);
        }
    }

    #[tokio::test]
    async fn test_history_window_caps_at_ten_oldest_first() {
        let provider = Arc::new(RecordingProvider::new("r"));
        let (orchestrator, _) = orchestrator_with(provider.clone()).await;

        // 7 exchanges stored = 14 messages, window keeps the last 10
        for i in 0..7 {
            let mut prompt = ChatPrompt::new(format!("q{}", i));
            prompt.session_id = Some("s".to_string());
            orchestrator.process(prompt).await.unwrap();
        }

        let mut prompt = ChatPrompt::new("final");
        prompt.session_id = Some("s".to_string());
        orchestrator.process(prompt).await.unwrap();

        let conversation = provider.last_conversation();
        // 10 history turns plus the new user message
        assert_eq!(conversation.len(), 11);
        assert_eq!(conversation[0].content, "q2");
        assert_eq!(conversation[10].content, "final");
    }

    #[tokio::test]
    async fn test_stored_count_is_2n_after_n_calls() {
        let provider = Arc::new(RecordingProvider::new("r"));
        let (orchestrator, _) = orchestrator_with(provider).await;

        for i in 0..4 {
            let mut prompt = ChatPrompt::new(format!("q{}", i));
            prompt.session_id = Some("s".to_string());
            orchestrator.process(prompt).await.unwrap();
        }

        let log = orchestrator.get_history("s").await.unwrap().unwrap();
        assert_eq!(log.messages.len(), 8);
    }

    #[tokio::test]
    async fn test_inference_failure_writes_nothing() {
        let (orchestrator, store) = orchestrator_with(Arc::new(FailingProvider)).await;

        let mut prompt = ChatPrompt::new("doomed");
        prompt.session_id = Some("s".to_string());

        let err = orchestrator.process(prompt).await.unwrap_err();
        assert!(matches!(err, ConfabError::Llm(_)));
        assert!(store.get_log("s").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_miss_is_none() {
        let provider = Arc::new(RecordingProvider::new("r"));
        let (orchestrator, _) = orchestrator_with(provider).await;
        assert!(orchestrator.get_history("ghost").await.unwrap().is_none());
    }
}
