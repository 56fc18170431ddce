//! API route configuration.
//!
//! Routes here need an owner identity and run behind
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    delete_user_urls_handler, shorten_batch_handler, shorten_handler, shorten_text_handler,
    user_urls_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes that act on behalf of an owner.
///
/// # Endpoints
///
/// - `POST   /`                   - Shorten a plain-text URL
/// - `POST   /api/shorten`        - Shorten a JSON URL
/// - `POST   /api/shorten/batch`  - Shorten many URLs
/// - `GET    /api/user/urls`      - List the owner's links
/// - `DELETE /api/user/urls`      - Delete the owner's links in the background
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(shorten_text_handler))
        .route("/api/shorten", post(shorten_handler))
        .route("/api/shorten/batch", post(shorten_batch_handler))
        .route(
            "/api/user/urls",
            get(user_urls_handler).delete(delete_user_urls_handler),
        )
}
