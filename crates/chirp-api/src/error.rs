use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use chirp_db::StoreError;

/// Handler failures. Client-side rejections echo the submitted body back.
#[derive(Debug)]
pub enum ApiError {
    InvalidInput(Option<Value>),
    Conflict(Value),
    Unauthenticated(Value),
    Internal(String),
}

/// JSON copy of a rejected request body, for echoing back to the client.
pub fn echo<T: Serialize>(body: &T) -> Value {
    serde_json::to_value(body).unwrap_or_default()
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {e}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidInput(Some(body)) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
            ApiError::InvalidInput(None) => StatusCode::BAD_REQUEST.into_response(),
            ApiError::Conflict(body) => (StatusCode::CONFLICT, Json(body)).into_response(),
            ApiError::Unauthenticated(body) => (StatusCode::UNAUTHORIZED, Json(body)).into_response(),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}
