use axum::{Router, routing::post};
use utoipa::OpenApi;

use super::handlers::analyze::{__path_analyze, analyze};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(analyze))]
pub struct AnalysisApiDoc;

pub fn analysis_routes(state: AppState) -> Router<AppState> {
    Router::new().route(
        &format!("{}/analyze", state.args.root_path),
        post(analyze),
    )
}
