use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use super::handlers::{
    get_history::{__path_get_history, get_history},
    save_result::{__path_save_result, save_result},
};
use crate::application::http::server::app_state::AppState;

#[derive(OpenApi)]
#[openapi(paths(save_result, get_history))]
pub struct HistoryApiDoc;

pub fn history_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/save", state.args.root_path),
            post(save_result),
        )
        .route(
            &format!("{}/history", state.args.root_path),
            get(get_history),
        )
}
