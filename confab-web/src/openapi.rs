//! OpenAPI specification for the Confab web server

use utoipa::OpenApi;

use crate::handlers::{
    ChatRequest, ChatResponse, ErrorResponse, HealthResponse, PlanRequest, PlanResponse,
    PlannedSearch,
};

/// Main OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Confab API",
        version = "0.1.0",
        description = "Smart chatbot with persistent conversation history and a research planner"
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::chat,
        crate::handlers::get_chat_history,
        crate::handlers::plan_research,
    ),
    components(
        schemas(
            HealthResponse,
            ChatRequest,
            ChatResponse,
            ErrorResponse,
            PlanRequest,
            PlanResponse,
            PlannedSearch,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Chat", description = "Chat and conversation history"),
        (name = "Research", description = "Research planning"),
    )
)]
pub struct ApiDoc;
