//! Request and response types for the HTTP API

use confab_core::{TokenUsage, Turn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chat request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's message
    #[schema(example = "Hello")]
    pub message: String,
    /// Session ID for conversation continuity; generated when absent
    pub session_id: Option<String>,
    /// Extra role/content pairs inserted between stored history and the
    /// new message
    #[schema(value_type = Option<Vec<Object>>)]
    pub context: Option<Vec<Turn>>,
    /// Custom system prompt, placed first in the conversation
    pub system_prompt: Option<String>,
    /// Response randomness, 0 to 2
    #[schema(example = 0.7)]
    pub temperature: Option<f32>,
    /// Maximum response length in tokens, 1 to 4000
    #[schema(example = 1000)]
    pub max_tokens: Option<u32>,
}

/// Chat response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(value_type = Object)]
    pub usage: TokenUsage,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Error detail returned with non-2xx statuses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Research plan request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlanRequest {
    /// The research question to decompose
    #[schema(example = "impact of remote work on urban housing")]
    pub query: String,
}

/// One planned search
#[derive(Debug, Serialize, ToSchema)]
pub struct PlannedSearch {
    #[schema(example = "remote work urban housing prices")]
    pub query: String,
    #[schema(example = "Identify how remote work shifts housing demand")]
    pub reason: String,
}

/// Research plan response body
#[derive(Debug, Serialize, ToSchema)]
pub struct PlanResponse {
    pub searches: Vec<PlannedSearch>,
}
