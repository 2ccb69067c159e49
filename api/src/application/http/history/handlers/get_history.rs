use axum::extract::{Query, State};
use nutritot_core::domain::{analysis::entities::AnalysisResult, history::ports::HistoryService};
use serde_json::Value;

use crate::application::http::{
    history::validators::GetHistoryParams,
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse},
            response::Response,
        },
        app_state::AppState,
    },
};

#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    summary = "List saved analysis results",
    params(GetHistoryParams),
    responses(
        (status = 200, body = Vec<AnalysisResult>),
        (status = 500, body = ApiErrorResponse)
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<GetHistoryParams>,
) -> Result<Response<Vec<Value>>, ApiError> {
    let documents = state
        .service
        .fetch_history(params.user_filter())
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(documents))
}
