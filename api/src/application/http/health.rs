use axum::{Router, extract::State, routing::get};
use nutritot_core::domain::history::ports::HistoryService;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::application::http::server::{
    api_entities::{
        api_error::{ApiError, ApiErrorResponse},
        response::Response,
    },
    app_state::AppState,
};

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn live() -> Response<HealthResponse> {
    Response::OK(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    summary = "Check that the history store answers",
    responses(
        (status = 200, body = HealthResponse),
        (status = 500, body = ApiErrorResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> Result<Response<HealthResponse>, ApiError> {
    state.service.readiness().await.map_err(ApiError::from)?;

    Ok(Response::OK(HealthResponse {
        status: "ready".to_string(),
    }))
}

#[derive(OpenApi)]
#[openapi(paths(live, ready))]
pub struct HealthApiDoc;

pub fn health_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(&format!("{}/health/live", state.args.root_path), get(live))
        .route(&format!("{}/health/ready", state.args.root_path), get(ready))
}
