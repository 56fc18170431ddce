//! Storage liveness endpoint.

use axum::{extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

/// Checks that the storage backend answers.
///
/// # Endpoint
///
/// `GET /ping`
///
/// Returns 200 OK when the backend is reachable and 500 otherwise.
pub async fn ping_handler(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.shortener.ping().await?;
    Ok(StatusCode::OK)
}
