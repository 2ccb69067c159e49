use axum::extract::State;
use nutritot_core::domain::{analysis::entities::AnalysisResult, history::ports::HistoryService};
use serde_json::Value;

use crate::application::http::server::{
    api_entities::{
        api_error::{ApiError, ApiErrorResponse, ApiJson},
        response::Response,
    },
    app_state::AppState,
};

#[utoipa::path(
    post,
    path = "/save",
    tag = "history",
    summary = "Save an analysis result",
    description = "Stores the document keyed by its id, replacing any earlier version. Missing nested fields are filled with null.",
    request_body = AnalysisResult,
    responses(
        (status = 200, body = AnalysisResult),
        (status = 400, body = ApiErrorResponse),
        (status = 500, body = ApiErrorResponse)
    )
)]
pub async fn save_result(
    State(state): State<AppState>,
    ApiJson(document): ApiJson<Value>,
) -> Result<Response<Value>, ApiError> {
    let saved = state
        .service
        .save_result(document)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(saved))
}
