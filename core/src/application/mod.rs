use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    domain::{
        common::{HistoryConfig, NutritotConfig, entities::app_errors::CoreError, services::Service},
        history::{outbox::HistoryOutbox, ports::HistoryRepository},
    },
    infrastructure::{
        db::postgres::{Postgres, PostgresConfig},
        history::{InMemoryHistoryRepository, PostgresHistoryRepository},
        llm::AzureOpenAIClient,
    },
};

/// Document store selected at start-up.
pub enum HistoryStore {
    Postgres(PostgresHistoryRepository),
    Memory(InMemoryHistoryRepository),
}

impl HistoryRepository for HistoryStore {
    async fn create(&self, document: Value) -> Result<Value, CoreError> {
        match self {
            HistoryStore::Postgres(repository) => repository.create(document).await,
            HistoryStore::Memory(repository) => repository.create(document).await,
        }
    }

    async fn upsert(&self, document: Value) -> Result<Value, CoreError> {
        match self {
            HistoryStore::Postgres(repository) => repository.upsert(document).await,
            HistoryStore::Memory(repository) => repository.upsert(document).await,
        }
    }

    async fn find_all(&self) -> Result<Vec<Value>, CoreError> {
        match self {
            HistoryStore::Postgres(repository) => repository.find_all().await,
            HistoryStore::Memory(repository) => repository.find_all().await,
        }
    }

    async fn find_by_field(&self, field: String, value: String) -> Result<Vec<Value>, CoreError> {
        match self {
            HistoryStore::Postgres(repository) => repository.find_by_field(field, value).await,
            HistoryStore::Memory(repository) => repository.find_by_field(field, value).await,
        }
    }

    async fn ping(&self) -> Result<(), CoreError> {
        match self {
            HistoryStore::Postgres(repository) => repository.ping().await,
            HistoryStore::Memory(repository) => repository.ping().await,
        }
    }
}

pub type NutritotService = Service<HistoryStore, AzureOpenAIClient>;

/// Builds the service and starts its persistence worker.
pub async fn create_service(
    config: NutritotConfig,
) -> Result<(NutritotService, JoinHandle<()>), CoreError> {
    let store = match config.history {
        HistoryConfig::Postgres(database) => {
            let postgres = Postgres::new(PostgresConfig {
                database_url: database.url(),
            })
            .await?;
            HistoryStore::Postgres(PostgresHistoryRepository::new(postgres.get_db()))
        }
        HistoryConfig::Memory => {
            info!("Using in-memory history store, results will not survive a restart");
            HistoryStore::Memory(InMemoryHistoryRepository::new())
        }
    };

    let history_repository = Arc::new(store);
    let llm_client = AzureOpenAIClient::new(config.llm)?;
    let (outbox, worker) = HistoryOutbox::start(Arc::clone(&history_repository), &config.outbox);

    Ok((Service::new(history_repository, llm_client, outbox), worker))
}
