//! Handlers for an owner's own links.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::UserUrl;
use crate::application::services::Owner;
use crate::error::AppError;
use crate::state::AppState;

fn require_known(owner: &Owner) -> Result<(), AppError> {
    if owner.is_new {
        return Err(AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "No owner token was presented" }),
        ));
    }
    Ok(())
}

/// Lists links created by the requesting owner.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Responses
///
/// - `200 OK` with `[{ "short_url": "...", "original_url": "..." }]`
/// - `204 No Content` when the owner has no live links
/// - `401 Unauthorized` when the request carried no valid token
pub async fn user_urls_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Response, AppError> {
    require_known(&owner)?;

    let urls = state.shortener.get_user_urls(&owner.id).await?;
    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<UserUrl> = urls
        .into_iter()
        .map(|item| UserUrl {
            short_url: state.short_url(&item.short_code),
            original_url: item.original_url,
        })
        .collect();

    Ok(Json(body).into_response())
}

/// Schedules deletion of the owner's links.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["Ab3_x9Qz", "Zz0-kLm1"]
/// ```
///
/// Answers `202 Accepted` at once. Codes that do not belong to the owner are
/// ignored. Deletion happens in the background.
pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Json(codes): Json<Vec<String>>,
) -> Result<StatusCode, AppError> {
    require_known(&owner)?;

    // The handle is dropped; the deletion keeps running on its own.
    let _ = state.shortener.delete_urls(&owner.id, codes);

    Ok(StatusCode::ACCEPTED)
}
