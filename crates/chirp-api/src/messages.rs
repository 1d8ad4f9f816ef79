use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use chirp_types::api::{MessageTextUpdate, NewMessage};

use crate::error::{ApiError, echo};
use crate::state::{AppState, run_blocking};

pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<NewMessage>,
) -> Result<impl IntoResponse, ApiError> {
    let candidate = req.clone();
    let created = run_blocking(&state, move |s| Ok(s.messages.create_message(&candidate)?)).await?;

    match created {
        Some(message) => Ok(Json(message)),
        None => Err(ApiError::InvalidInput(Some(echo(&req)))),
    }
}

pub async fn list_messages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let messages = run_blocking(&state, |s| Ok(s.messages.list_messages()?)).await?;
    Ok(Json(messages))
}

/// An unknown id is not an error: 200 with an empty body.
pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Response, ApiError> {
    let message = run_blocking(&state, move |s| Ok(s.messages.get_message(message_id)?)).await?;

    Ok(match message {
        Some(message) => Json(message).into_response(),
        None => StatusCode::OK.into_response(),
    })
}

/// Body is the number of affected rows (`1`), or empty if nothing was deleted.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Response, ApiError> {
    let deleted = run_blocking(&state, move |s| Ok(s.messages.delete_message(message_id)?)).await?;

    Ok(if deleted {
        Json(1).into_response()
    } else {
        StatusCode::OK.into_response()
    })
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Json(req): Json<MessageTextUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = run_blocking(&state, move |s| {
        Ok(s.messages.update_message_text(message_id, req.message_text.as_deref())?)
    })
    .await?;

    if updated {
        Ok(Json(1))
    } else {
        Err(ApiError::InvalidInput(None))
    }
}

pub async fn list_account_messages(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = run_blocking(&state, move |s| {
        Ok(s.messages.list_messages_by_account(account_id)?)
    })
    .await?;

    Ok(Json(messages))
}
