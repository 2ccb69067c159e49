use std::future::Future;

use crate::domain::{
    analysis::{
        entities::AnalysisResult,
        value_objects::{AnalyzeIngredientsInput, ChatMessage},
    },
    common::entities::app_errors::CoreError,
};

/// LLM Client trait for calling a chat-completion model
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    /// Returns the text content of the first choice.
    fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Service trait for label analysis business logic
#[cfg_attr(test, mockall::automock)]
pub trait AnalysisService: Send + Sync {
    fn analyze_ingredients(
        &self,
        input: AnalyzeIngredientsInput,
    ) -> impl Future<Output = Result<AnalysisResult, CoreError>> + Send;
}
