use std::future::Future;

use serde_json::Value;

use crate::domain::{
    analysis::{entities::AnalysisResult, value_objects::AnalyzeIngredientsInput},
    common::entities::app_errors::CoreError,
};

/// Schema-free document store holding analysis results keyed by `id`.
#[cfg_attr(test, mockall::automock)]
pub trait HistoryRepository: Send + Sync + 'static {
    /// Inserts a new document; an existing id is an error.
    fn create(&self, document: Value) -> impl Future<Output = Result<Value, CoreError>> + Send;

    /// Inserts or replaces the document with the same id.
    fn upsert(&self, document: Value) -> impl Future<Output = Result<Value, CoreError>> + Send;

    /// Every document, in store order.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Value>, CoreError>> + Send;

    /// Documents whose top-level `field` equals `value`.
    fn find_by_field(
        &self,
        field: String,
        value: String,
    ) -> impl Future<Output = Result<Vec<Value>, CoreError>> + Send;

    fn ping(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Service trait for the history façade
#[cfg_attr(test, mockall::automock)]
pub trait HistoryService: Send + Sync {
    fn save_result(
        &self,
        document: Value,
    ) -> impl Future<Output = Result<Value, CoreError>> + Send;

    fn fetch_history(
        &self,
        user_id: Option<String>,
    ) -> impl Future<Output = Result<Vec<Value>, CoreError>> + Send;

    /// Analyzes, answers at once, and leaves persistence to the outbox.
    fn analyze_and_record(
        &self,
        input: AnalyzeIngredientsInput,
    ) -> impl Future<Output = Result<AnalysisResult, CoreError>> + Send;

    fn readiness(&self) -> impl Future<Output = Result<(), CoreError>> + Send;
}
