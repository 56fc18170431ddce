//! Handlers for creating short links.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::{BatchRequestItem, BatchResponseItem, ShortenRequest, ShortenResponse};
use crate::application::services::{Owner, ShortenError};
use crate::domain::entities::BatchItem;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::validate_url;

fn check_url(raw: &str) -> Result<(), AppError> {
    validate_url(raw).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })
}

/// Shortens a URL sent as the plain-text request body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Responses
///
/// - `201 Created` with the short URL as `text/plain`
/// - `409 Conflict` with the existing short URL as `text/plain`
/// - `400 Bad Request` if the body is not an HTTP(S) URL
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    body: String,
) -> Result<Response, AppError> {
    let url = body.trim();
    check_url(url)?;

    let (status, code) = match state.shortener.cut(url, &owner.id).await {
        Ok(code) => (StatusCode::CREATED, code),
        Err(ShortenError::Duplicate { code, .. }) => (StatusCode::CONFLICT, code),
        Err(e) => return Err(e.into()),
    };

    Ok((
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.short_url(&code),
    )
        .into_response())
}

/// Shortens a single URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "http://ya.ru" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/Ab3_x9Qz" }
/// ```
///
/// `201 Created` for a new link, `409 Conflict` with the existing link if the
/// URL was shortened before.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;
    let url = payload.url.trim();
    check_url(url)?;

    let (status, code) = match state.shortener.cut(url, &owner.id).await {
        Ok(code) => (StatusCode::CREATED, code),
        Err(ShortenError::Duplicate { code, .. }) => (StatusCode::CONFLICT, code),
        Err(e) => return Err(e.into()),
    };

    let body = ShortenResponse {
        result: state.short_url(&code),
    };

    Ok((status, Json(body)).into_response())
}

/// Shortens many URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Request Body
///
/// ```json
/// [{ "correlation_id": "1", "original_url": "http://a.com" }]
/// ```
///
/// # Response
///
/// `201 Created` with `[{ "correlation_id": "1", "short_url": "..." }]`.
/// URLs shortened earlier keep their existing short URL.
///
/// # Errors
///
/// Returns 400 Bad Request for an empty batch or any invalid URL.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    Json(payload): Json<Vec<BatchRequestItem>>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Err(AppError::bad_request("Batch must not be empty", json!({})));
    }

    for item in &payload {
        item.validate()?;
        check_url(&item.original_url)?;
    }

    let items = payload
        .into_iter()
        .map(|item| BatchItem::new(item.correlation_id, item.original_url.trim()))
        .collect();

    let results = state.shortener.upload_batch(&owner.id, items).await?;

    let body: Vec<BatchResponseItem> = results
        .into_iter()
        .map(|item| BatchResponseItem {
            short_url: state.short_url(&item.short_code),
            correlation_id: item.correlation_id,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(body)))
}
