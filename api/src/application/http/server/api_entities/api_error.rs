use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nutritot_core::domain::common::entities::app_errors::CoreError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InternalServerError(String),
}

/// Error payload returned by every endpoint.
#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub error: String,
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        ApiError::InternalServerError(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError(message) => {
                error!(error = %message, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ApiErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// JSON body extractor whose rejection uses the `{ "error": ... }` payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_become_internal_server_errors() {
        let error = ApiError::from(CoreError::ResponseFormatError("no JSON object".into()));

        assert!(matches!(error, ApiError::InternalServerError(_)));
        assert_eq!(
            error.to_string(),
            "Failed to parse LLM response as JSON: no JSON object"
        );
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_keeps_its_status() {
        let response = ApiError::BadRequest("missing field".into()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
