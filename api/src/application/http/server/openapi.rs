use utoipa::OpenApi;

use crate::application::http::{
    analysis::router::AnalysisApiDoc, health::HealthApiDoc, history::router::HistoryApiDoc,
};

#[derive(OpenApi)]
#[openapi(info(
    title = "NutriTot API",
    description = "Ingredient analysis and result history for toddler food labels"
))]
pub struct ApiDoc;

impl ApiDoc {
    /// The full document, every feature router included.
    pub fn build() -> utoipa::openapi::OpenApi {
        ApiDoc::openapi()
            .merge_from(AnalysisApiDoc::openapi())
            .merge_from(HistoryApiDoc::openapi())
            .merge_from(HealthApiDoc::openapi())
    }
}
