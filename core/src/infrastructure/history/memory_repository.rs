use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::{
    common::entities::app_errors::CoreError,
    history::{document_id, ports::HistoryRepository},
};

/// Process-local store keeping documents in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    documents: RwLock<Vec<Value>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(documents: &[Value], id: &str) -> Option<usize> {
    documents
        .iter()
        .position(|d| document_id(d).is_ok_and(|existing| existing == id))
}

impl HistoryRepository for InMemoryHistoryRepository {
    async fn create(&self, document: Value) -> Result<Value, CoreError> {
        let id = document_id(&document)?;
        let mut documents = self.documents.write().await;

        if position(&documents, &id).is_some() {
            return Err(CoreError::StorageError(format!(
                "document {} already exists",
                id
            )));
        }

        documents.push(document.clone());
        Ok(document)
    }

    async fn upsert(&self, document: Value) -> Result<Value, CoreError> {
        let id = document_id(&document)?;
        let mut documents = self.documents.write().await;

        match position(&documents, &id) {
            Some(index) => documents[index] = document.clone(),
            None => documents.push(document.clone()),
        }

        Ok(document)
    }

    async fn find_all(&self) -> Result<Vec<Value>, CoreError> {
        Ok(self.documents.read().await.clone())
    }

    async fn find_by_field(&self, field: String, value: String) -> Result<Vec<Value>, CoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| d.get(&field).and_then(Value::as_str) == Some(value.as_str()))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
