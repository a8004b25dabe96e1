//! Research planner handler

use super::types::{ErrorResponse, PlanRequest, PlanResponse, PlannedSearch};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json, Json as JsonExtractor};
use confab_core::ConfabError;
use confab_research::Planner;
use tracing::{error, info};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Produce a search plan for a research question
#[utoipa::path(
    post,
    path = "/api/research/plan",
    tag = "Research",
    summary = "Plan web searches",
    description = "Decompose a research question into 3-6 focused web searches",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Plan generated", body = PlanResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Model output failed schema validation", body = ErrorResponse),
        (status = 500, description = "Inference failure", body = ErrorResponse)
    )
)]
pub async fn plan_research(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<PlanRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new("query must not be empty")),
        ));
    }

    info!("Planning research for: {}", request.query);

    let planner = Planner::new(state.llm.clone());
    match planner.plan(&request.query).await {
        Ok(plan) => Ok(Json(PlanResponse {
            searches: plan
                .searches
                .into_iter()
                .map(|item| PlannedSearch {
                    query: item.query,
                    reason: item.reason,
                })
                .collect(),
        })),
        // A malformed plan is a distinct condition, not a generic failure
        Err(ConfabError::PlanSchema(reason)) => {
            error!("Plan failed schema validation: {}", reason);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new(format!(
                    "Generated plan failed validation: {}",
                    reason
                ))),
            ))
        }
        Err(e) => {
            error!("Research planning failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Error planning research")),
            ))
        }
    }
}
