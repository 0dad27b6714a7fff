//! Per-request error type with automatic HTTP status mapping.
//!
//! Every handler failure is converted here into a JSON body carrying an
//! `error` field; nothing propagates past the handler boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or path parameter (400).
    Validation(String),

    /// Referenced entity absent (404).
    NotFound(String),

    /// Uniqueness violation (409).
    Conflict(String),

    /// Unexpected storage failure (500). Carries the user-visible message;
    /// the underlying cause is logged where the error is raised.
    Database(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => (StatusCode::CONFLICT, message),
            Self::Database(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => {
                Self::NotFound(format!("{resource} with id {id} was not found"))
            }
            other => {
                tracing::error!(error = %other, "database error");
                Self::Database("an internal error occurred".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let response = ApiError::Validation("User id must be an integer".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "User id must be an integer");
    }

    #[tokio::test]
    async fn conflict_is_409() {
        let response =
            ApiError::Conflict("User with email a@b.c already exists".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn db_not_found_maps_to_404_with_entity_message() {
        let err: ApiError = DbError::NotFound {
            resource: "Todo item",
            id: 42,
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Todo item with id 42 was not found");
    }

    #[tokio::test]
    async fn other_db_errors_map_to_500() {
        let err: ApiError = DbError::MissingInsertId.into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
