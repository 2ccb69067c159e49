use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{
    analysis::{ports::LLMClient, value_objects::ChatMessage},
    common::{LLMConfig, entities::app_errors::CoreError},
};

/// Chat-completion client for an Azure OpenAI deployment.
#[derive(Debug, Clone)]
pub struct AzureOpenAIClient {
    endpoint: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<MessageResponse>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

impl AzureOpenAIClient {
    pub fn new(config: LLMConfig) -> Result<Self, CoreError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            tracing::error!("Failed to build LLM HTTP client: {}", e);
            CoreError::InternalServerError
        })?;

        Ok(Self {
            endpoint: config.endpoint,
            api_key: config.api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    async fn call_chat_api(&self, request: ChatCompletionRequest<'_>) -> Result<String, CoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("LLM API request failed: {}", e);
                CoreError::UpstreamRequestError(format!("LLM API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("LLM API error: {} - {}", status, error_text);
            return Err(CoreError::UpstreamRequestError(format!(
                "LLM API returned error: {}",
                status
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse LLM response: {}", e);
            CoreError::ResponseFormatError(format!("Failed to parse LLM response: {}", e))
        })?;

        // An empty reply surfaces later as a missing JSON object.
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

impl LLMClient for AzureOpenAIClient {
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, CoreError> {
        let request = ChatCompletionRequest {
            messages: &messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        self.call_chat_api(request).await
    }
}
