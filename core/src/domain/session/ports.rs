use std::future::Future;

use crate::domain::{analysis::entities::AnalysisResult, common::entities::app_errors::CoreError};

/// Client-side access to the remote history service.
pub trait HistoryGateway: Send + Sync {
    fn save(
        &self,
        result: &AnalysisResult,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn fetch(
        &self,
        user_id: Option<String>,
    ) -> impl Future<Output = Result<Vec<AnalysisResult>, CoreError>> + Send;
}
