//! Chat and history handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use confab_chat::ChatPrompt;
use confab_core::ConversationLog;
use tracing::{error, info};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Reject out-of-range generation parameters before any orchestration runs
fn validate_chat_request(request: &ChatRequest) -> Result<(), String> {
    if request.message.trim().is_empty() {
        return Err("message must not be empty".to_string());
    }

    if let Some(temperature) = request.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(format!(
                "temperature must be between 0 and 2, got {}",
                temperature
            ));
        }
    }

    if let Some(max_tokens) = request.max_tokens {
        if !(1..=4000).contains(&max_tokens) {
            return Err(format!(
                "max_tokens must be between 1 and 4000, got {}",
                max_tokens
            ));
        }
    }

    Ok(())
}

/// Handle a chat message
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    summary = "Send a chat message",
    description = "Send a message to the assistant and receive a reply. A new session is created when no session_id is supplied.",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply generated", body = ChatResponse),
        (status = 422, description = "Invalid request parameters", body = ErrorResponse),
        (status = 500, description = "Inference or storage failure", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if let Err(reason) = validate_chat_request(&request) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(reason)),
        ));
    }

    info!(
        "Processing chat message ({} chars, session: {:?})",
        request.message.len(),
        request.session_id
    );

    let prompt = ChatPrompt {
        message: request.message,
        session_id: request.session_id,
        context: request.context,
        system_prompt: request.system_prompt,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    };

    match state.orchestrator.process(prompt).await {
        Ok(reply) => Ok(Json(ChatResponse {
            response: reply.response,
            session_id: reply.session_id,
            timestamp: reply.timestamp,
            usage: reply.usage,
        })),
        Err(e) => {
            // The cause stays in the logs; callers get an opaque error
            error!("Chat request failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error processing chat")),
            ))
        }
    }
}

/// Get chat history for a session
#[utoipa::path(
    get,
    path = "/api/chat/history/{session_id}",
    tag = "Chat",
    summary = "Get chat history",
    description = "Retrieve the stored conversation log for a session",
    params(
        ("session_id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Conversation log retrieved"),
        (status = 404, description = "No log exists for this session", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationLog>, ApiError> {
    match state.orchestrator.get_history(&session_id).await {
        Ok(Some(log)) => Ok(Json(log)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Chat history not found")),
        )),
        Err(e) => {
            error!("History lookup failed for {}: {}", session_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error retrieving chat history")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(temperature: Option<f32>, max_tokens: Option<u32>) -> ChatRequest {
        ChatRequest {
            message: "hi".to_string(),
            session_id: None,
            context: None,
            system_prompt: None,
            temperature,
            max_tokens,
        }
    }

    #[test]
    fn test_validation_accepts_in_range_values() {
        assert!(validate_chat_request(&request(Some(0.0), Some(1))).is_ok());
        assert!(validate_chat_request(&request(Some(2.0), Some(4000))).is_ok());
        assert!(validate_chat_request(&request(None, None)).is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        assert!(validate_chat_request(&request(Some(2.1), None)).is_err());
        assert!(validate_chat_request(&request(Some(-0.1), None)).is_err());
        assert!(validate_chat_request(&request(None, Some(0))).is_err());
        assert!(validate_chat_request(&request(None, Some(4001))).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_message() {
        let mut req = request(None, None);
        req.message = "   ".to_string();
        assert!(validate_chat_request(&req).is_err());
    }
}
