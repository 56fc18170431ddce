//! Handler for service statistics.

use std::net::IpAddr;

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::json;

use crate::api::dto::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns total live URLs and distinct owners.
///
/// # Endpoint
///
/// `GET /api/internal/stats`
///
/// # Access
///
/// Only clients whose `X-Real-IP` lies in the configured trusted subnet are
/// served. Without a trusted subnet every request is refused.
///
/// # Errors
///
/// Returns 403 Forbidden for untrusted or unidentifiable clients.
pub async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    let client_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    let trusted = match (state.trusted_subnet, client_ip) {
        (Some(subnet), Some(ip)) => subnet.contains(ip),
        _ => false,
    };

    if !trusted {
        return Err(AppError::forbidden(
            "Forbidden",
            json!({ "reason": "Client is not in the trusted subnet" }),
        ));
    }

    let stats = state.shortener.stats().await?;
    Ok(Json(stats.into()))
}
