//! OpenAI-compatible chat completions client
//!
//! A thin wrapper over the `/chat/completions` endpoint. Any provider that
//! speaks the OpenAI wire format works through `base_url`.

use crate::provider::InferenceProvider;
use async_trait::async_trait;
use confab_core::{
    Completion, ConfabError, ConfabResult, GenerationOptions, LlmConfig, Role, TokenUsage, Turn,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Fallback system message, prepended when the conversation does not open
/// with a system-role turn.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful, intelligent assistant. Follow these guidelines:
1. Provide clear, concise, and accurate responses
2. Ask for clarification when the query is ambiguous
3. Use structured formatting when appropriate
4. Be friendly and professional
5. Admit when you don't know something
6. Provide sources or references when making factual claims";

/// Client for an OpenAI-compatible inference API
pub struct ConfabLlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl ConfabLlmClient {
    /// Create a new LLM client
    pub fn new(config: LlmConfig) -> Self {
        info!(
            "Created LLM client for model: {} at {}",
            config.model, config.base_url
        );

        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Prepend the default system message when the conversation does not
    /// start with one. The caller's store never sees this mutation.
    pub fn ensure_system_prompt(conversation: &mut Vec<Turn>) {
        let has_system = conversation
            .first()
            .map(|turn| turn.role == Role::System)
            .unwrap_or(false);

        if !has_system {
            conversation.insert(0, Turn::system(DEFAULT_SYSTEM_PROMPT));
        }
    }
}

#[async_trait]
impl InferenceProvider for ConfabLlmClient {
    async fn generate(
        &self,
        mut conversation: Vec<Turn>,
        options: &GenerationOptions,
    ) -> ConfabResult<Completion> {
        let start_time = Instant::now();

        Self::ensure_system_prompt(&mut conversation);

        debug!("Generating response with {} messages", conversation.len());

        let model = options.model.as_deref().unwrap_or(&self.config.model);
        let body = ChatCompletionRequest {
            model,
            messages: &conversation,
            temperature: options.temperature.unwrap_or(self.config.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            presence_penalty: 0.6,
            frequency_penalty: 0.3,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut request = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConfabError::Llm(format!("Inference request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ConfabError::Llm(format!(
                "Inference API returned {}: {}",
                status, detail
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ConfabError::Llm(format!("Malformed inference response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ConfabError::Llm("No text content in inference response".to_string()))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        info!(
            "Generated response in {:?} ({} chars, {} tokens)",
            start_time.elapsed(),
            content.len(),
            usage.total_tokens
        );

        Ok(Completion { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_injected_when_absent() {
        let mut conversation = vec![Turn::user("hello")];
        ConfabLlmClient::ensure_system_prompt(&mut conversation);

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].role, Role::System);
        assert_eq!(conversation[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(conversation[1].content, "hello");
    }

    #[test]
    fn test_system_prompt_not_duplicated() {
        let mut conversation = vec![Turn::system("custom prompt"), Turn::user("hello")];
        ConfabLlmClient::ensure_system_prompt(&mut conversation);

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].content, "custom prompt");
    }

    #[test]
    fn test_system_prompt_injected_into_empty_conversation() {
        let mut conversation = Vec::new();
        ConfabLlmClient::ensure_system_prompt(&mut conversation);

        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation[0].role, Role::System);
    }

    #[test]
    fn test_request_body_wire_format() {
        let messages = vec![Turn::system("s"), Turn::user("q")];
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.7,
            max_tokens: 1000,
            presence_penalty: 0.6,
            frequency_penalty: 0.3,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "q");
    }

    #[test]
    fn test_response_parsing_with_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "hi"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));
        assert_eq!(parsed.usage.as_ref().unwrap().total_tokens, 15);
    }

    #[test]
    fn test_response_parsing_without_usage() {
        let raw = r#"{"choices": [{"message": {"content": "hi"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }
}
