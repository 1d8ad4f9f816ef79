use axum::{Json, extract::State, response::IntoResponse};
use tracing::info;

use chirp_types::api::AccountCredentials;

use crate::error::{ApiError, echo};
use crate::service::RegistrationError;
use crate::state::{AppState, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<AccountCredentials>,
) -> Result<impl IntoResponse, ApiError> {
    let candidate = req.clone();
    let outcome = run_blocking(&state, move |s| Ok(s.accounts.register_account(&candidate))).await?;

    match outcome {
        Ok(account) => {
            info!("Registered account {} ({})", account.account_id, account.username);
            Ok(Json(account))
        }
        Err(RegistrationError::InvalidUsername) => Err(ApiError::InvalidInput(Some(echo(&req)))),
        Err(RegistrationError::DuplicateUsername(_)) => Err(ApiError::Conflict(echo(&req))),
        Err(RegistrationError::Store(e)) => Err(e.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<AccountCredentials>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = req.clone();
    let account = run_blocking(&state, move |s| Ok(s.accounts.login(&credentials)?))
        .await?
        .ok_or_else(|| ApiError::Unauthenticated(echo(&req)))?;

    Ok(Json(account))
}
