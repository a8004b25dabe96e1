//! Route definitions for the Confab web server

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Chat endpoints
        .route("/chat", post(handlers::chat))
        .route(
            "/chat/history/{session_id}",
            get(handlers::get_chat_history),
        )
        // Research planner
        .route("/research/plan", post(handlers::plan_research))
}
