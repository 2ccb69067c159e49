use chrono::Utc;
use sea_orm::{
    ActiveValue::Set,
    DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::{Expr, OnConflict, SimpleExpr, extension::postgres::PgExpr},
};
use serde_json::{Map, Value};
use tracing::error;

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        history::{document_id, ports::HistoryRepository},
    },
    entity::analysis_documents::{ActiveModel, Column, Entity},
};

#[derive(Debug, Clone)]
pub struct PostgresHistoryRepository {
    pub db: DatabaseConnection,
}

impl PostgresHistoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn active_model(document: Value) -> Result<ActiveModel, CoreError> {
        let id = document_id(&document)?;
        let now = Utc::now().fixed_offset();

        Ok(ActiveModel {
            id: Set(id),
            document: Set(document),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    /// `document @> {"<field>": "<value>"}`: matches only string-typed fields,
    /// same as the in-memory store.
    fn field_equals(field: String, value: String) -> SimpleExpr {
        let mut fragment = Map::new();
        fragment.insert(field, Value::String(value));

        Expr::col(Column::Document).contains(Expr::val(Value::Object(fragment)))
    }
}

impl HistoryRepository for PostgresHistoryRepository {
    async fn create(&self, document: Value) -> Result<Value, CoreError> {
        let created = Entity::insert(Self::active_model(document)?)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to create analysis document: {}", e);
                CoreError::StorageError(e.to_string())
            })?;

        Ok(created.document)
    }

    async fn upsert(&self, document: Value) -> Result<Value, CoreError> {
        let stored = Entity::insert(Self::active_model(document)?)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([Column::Document, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to upsert analysis document: {}", e);
                CoreError::StorageError(e.to_string())
            })?;

        Ok(stored.document)
    }

    async fn find_all(&self) -> Result<Vec<Value>, CoreError> {
        let models = Entity::find().all(&self.db).await.map_err(|e| {
            error!("Failed to list analysis documents: {}", e);
            CoreError::StorageError(e.to_string())
        })?;

        Ok(models.into_iter().map(|m| m.document).collect())
    }

    async fn find_by_field(&self, field: String, value: String) -> Result<Vec<Value>, CoreError> {
        let models = Entity::find()
            .filter(Self::field_equals(field, value))
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to query analysis documents: {}", e);
                CoreError::StorageError(e.to_string())
            })?;

        Ok(models.into_iter().map(|m| m.document).collect())
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.db.ping().await.map_err(|e| {
            error!("Database ping failed: {}", e);
            CoreError::StorageError(e.to_string())
        })
    }
}
