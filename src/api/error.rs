use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use crate::upstream::ClientError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Store API rejected our credentials")]
    UpstreamUnauthorized,

    #[error("Store API error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::UpstreamUnauthorized => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication with the store API failed".to_string(),
                None,
            ),
            ApiError::Upstream(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to query the store API".to_string(),
                Some(detail.clone()),
            ),
            ApiError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(detail.clone()),
            ),
        };

        let body = match detail {
            Some(detail) => json!({ "error": message, "detail": detail }),
            None => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => ApiError::UpstreamUnauthorized,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
