use axum::extract::State;
use nutritot_core::domain::{analysis::entities::AnalysisResult, history::ports::HistoryService};
use tracing::info;

use crate::application::http::{
    analysis::validators::AnalyzeRequest,
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse, ApiJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[utoipa::path(
    post,
    path = "/analyze",
    tag = "analysis",
    summary = "Analyze an ingredient list",
    description = "Asks the model for a toddler-specific assessment of the ingredients. The result is returned at once and stored in the background.",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, body = AnalysisResult),
        (status = 400, body = ApiErrorResponse),
        (status = 500, body = ApiErrorResponse)
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AnalyzeRequest>,
) -> Result<Response<AnalysisResult>, ApiError> {
    let result = state
        .service
        .analyze_and_record(payload.into())
        .await
        .map_err(ApiError::from)?;

    info!(
        id = %result.id,
        is_healthy = result.is_healthy,
        concerns = result.concerns.len(),
        "Ingredients analyzed"
    );

    Ok(Response::OK(result))
}
