use reqwest::Client;
use serde_json::Value;
use tracing::{error, warn};
use url::Url;

use crate::domain::{
    analysis::entities::AnalysisResult, common::entities::app_errors::CoreError,
    session::ports::HistoryGateway,
};

/// Talks to the history endpoints of a running NutriTot server.
#[derive(Debug, Clone)]
pub struct HttpHistoryGateway {
    base_url: Url,
    client: Client,
}

impl HttpHistoryGateway {
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        // A trailing slash keeps `join` from dropping the last path segment.
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&base_url).map_err(|e| {
            CoreError::UpstreamRequestError(format!("Invalid server URL {}: {}", base_url, e))
        })?;

        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CoreError> {
        self.base_url
            .join(path)
            .map_err(|e| CoreError::UpstreamRequestError(e.to_string()))
    }
}

impl HistoryGateway for HttpHistoryGateway {
    async fn save(&self, result: &AnalysisResult) -> Result<(), CoreError> {
        let response = self
            .client
            .post(self.endpoint("save")?)
            .json(result)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach history service: {}", e);
                CoreError::UpstreamRequestError(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(CoreError::UpstreamRequestError(format!(
                "Failed to save analysis result: {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn fetch(&self, user_id: Option<String>) -> Result<Vec<AnalysisResult>, CoreError> {
        let mut url = self.endpoint("history")?;
        if let Some(user_id) = user_id {
            url.query_pairs_mut().append_pair("userId", &user_id);
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Failed to reach history service: {}", e);
            CoreError::UpstreamRequestError(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(CoreError::UpstreamRequestError(format!(
                "Failed to fetch analysis history: {}",
                response.status()
            )));
        }

        let documents: Vec<Value> = response
            .json()
            .await
            .map_err(|e| CoreError::ResponseFormatError(e.to_string()))?;

        // Stored documents are schema-free; skip the ones that don't decode.
        Ok(documents
            .into_iter()
            .filter_map(|document| match serde_json::from_value(document) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable history document");
                    None
                }
            })
            .collect())
    }
}
