pub mod outbox;
pub mod ports;
pub mod sanitize;
pub mod services;

pub use ports::*;

use crate::domain::common::entities::app_errors::CoreError;

/// Field the history can be filtered on.
pub const USER_ID_FIELD: &str = "userId";

/// The string `id` every stored document is keyed by.
pub fn document_id(document: &serde_json::Value) -> Result<String, CoreError> {
    match document.get("id") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(CoreError::StorageError(
            "document has no string id".to_string(),
        )),
    }
}
