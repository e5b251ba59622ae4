use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// Body shapes returned to clients.
///
/// Client errors about a missing resource answer with `{message}`, every
/// other failure with `{error}` carrying the underlying message.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorResponse {
    Message { message: String },
    Error { error: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::Error {
                    error: err.to_string(),
                },
            ),
            AppError::NotFound(err) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::Message {
                    message: err.to_string(),
                },
            ),
            AppError::InternalError(err) | AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::Error {
                    error: err.to_string(),
                },
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::Error {
                    error: format!("Configuration error: {}", err),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_renders_message_body() {
        let (status, body) = body_json(AppError::NotFound(anyhow::anyhow!("Habit not found"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "message": "Habit not found" }));
    }

    #[tokio::test]
    async fn database_error_carries_raw_message() {
        let (status, body) =
            body_json(AppError::DatabaseError(anyhow::anyhow!("connection refused"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "connection refused");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn bad_request_renders_error_body() {
        let (status, body) = body_json(AppError::BadRequest(anyhow::anyhow!("bad json"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad json");
    }
}
