use serde_json::Value;
use tracing::{error, instrument};

use crate::domain::{
    analysis::{
        entities::AnalysisResult, ports::LLMClient, services::run_analysis,
        value_objects::AnalyzeIngredientsInput,
    },
    common::{entities::app_errors::CoreError, services::Service},
    history::{
        USER_ID_FIELD, document_id,
        ports::{HistoryRepository, HistoryService},
        sanitize::sanitize,
    },
};

impl<H, LLM> HistoryService for Service<H, LLM>
where
    H: HistoryRepository,
    LLM: LLMClient,
{
    #[instrument(skip_all)]
    async fn save_result(&self, document: Value) -> Result<Value, CoreError> {
        let document = sanitize(document);
        document_id(&document)?;

        self.history_repository.upsert(document).await
    }

    async fn fetch_history(&self, user_id: Option<String>) -> Result<Vec<Value>, CoreError> {
        match user_id {
            Some(user_id) => {
                self.history_repository
                    .find_by_field(USER_ID_FIELD.to_string(), user_id)
                    .await
            }
            None => self.history_repository.find_all().await,
        }
    }

    async fn analyze_and_record(
        &self,
        input: AnalyzeIngredientsInput,
    ) -> Result<AnalysisResult, CoreError> {
        let result = run_analysis(&self.llm_client, input).await?;

        let document = serde_json::to_value(&result).map_err(|e| {
            error!("Failed to serialize analysis result: {}", e);
            CoreError::InternalServerError
        })?;
        self.outbox.enqueue(sanitize(document));

        Ok(result)
    }

    async fn readiness(&self) -> Result<(), CoreError> {
        self.history_repository.ping().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::{
        analysis::services::tests::{CannedLLMClient, WHEAT_TODDLER_REPLY},
        common::OutboxConfig,
        history::outbox::HistoryOutbox,
        profile::entities::BabyProfile,
    };
    use crate::infrastructure::history::memory_repository::InMemoryHistoryRepository;

    fn service(
        reply: &str,
    ) -> (
        Service<InMemoryHistoryRepository, CannedLLMClient>,
        Arc<InMemoryHistoryRepository>,
        tokio::task::JoinHandle<()>,
    ) {
        let repository = Arc::new(InMemoryHistoryRepository::new());
        let (outbox, worker) =
            HistoryOutbox::start(Arc::clone(&repository), &OutboxConfig::default());
        let service = Service::new(
            Arc::clone(&repository),
            CannedLLMClient::replying(reply),
            outbox,
        );
        (service, repository, worker)
    }

    #[tokio::test]
    async fn test_save_twice_keeps_one_document() {
        let (service, repository, _worker) = service("{}");

        service
            .save_result(json!({"id": "doc-1", "isHealthy": true}))
            .await
            .unwrap();
        let stored = service
            .save_result(json!({"id": "doc-1", "isHealthy": false}))
            .await
            .unwrap();

        assert_eq!(stored["isHealthy"], json!(false));
        let all = repository.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["isHealthy"], json!(false));
        assert!(all[0]["nutritionalInfo"].is_null());
    }

    #[tokio::test]
    async fn test_save_without_id_is_a_storage_error() {
        let (service, _repository, _worker) = service("{}");

        let err = service
            .save_result(json!({"isHealthy": true}))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::StorageError(_)));
    }

    #[tokio::test]
    async fn test_fetch_filters_by_user() {
        let (service, _repository, _worker) = service("{}");
        for (id, user) in [("a", json!("u1")), ("b", json!("u2")), ("c", json!("u1")), ("d", json!(null))] {
            service
                .save_result(json!({"id": id, "userId": user}))
                .await
                .unwrap();
        }

        let mine = service.fetch_history(Some("u1".to_string())).await.unwrap();
        let ids: Vec<_> = mine.iter().map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("c")]);
        assert!(mine.iter().all(|d| d["userId"] == json!("u1")));

        let everything = service.fetch_history(None).await.unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn test_analyze_responds_then_persists_in_background() {
        let (service, repository, worker) = service(WHEAT_TODDLER_REPLY);

        let result = service
            .analyze_and_record(AnalyzeIngredientsInput {
                ingredients_text: "sugar, wheat flour, salt".to_string(),
                profile: Some(
                    BabyProfile {
                        age_months: 18,
                        allergies: vec!["wheat".to_string()],
                    }
                    .into(),
                ),
                image_url: Some("data:image/jpeg;base64,AAA".to_string()),
                user_id: Some("u1".to_string()),
            })
            .await
            .unwrap();
        assert!(!result.is_healthy);

        drop(service);
        worker.await.unwrap();

        let stored = repository.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], json!(result.id.to_string()));
        assert_eq!(stored[0]["userId"], json!("u1"));
        assert_eq!(stored[0]["imageUrl"], json!("data:image/jpeg;base64,AAA"));
    }

    #[tokio::test]
    async fn test_analyze_failure_stores_nothing() {
        let (service, repository, worker) = service("no json here");

        let err = service
            .analyze_and_record(AnalyzeIngredientsInput {
                ingredients_text: "sugar".to_string(),
                profile: None,
                image_url: None,
                user_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ResponseFormatError(_)));

        drop(service);
        worker.await.unwrap();
        assert!(repository.find_all().await.unwrap().is_empty());
    }
}
