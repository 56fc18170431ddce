//! Owner identity middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::application::services::Owner;
use crate::state::AppState;

/// Name of the cookie carrying the owner token.
pub const TOKEN_COOKIE: &str = "token";

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Resolves the request's owner from its token, issuing a new one if needed.
///
/// # Token Sources
///
/// ```text
/// Cookie: token=<owner_id>.<mac>
/// Authorization: Bearer <owner_id>.<mac>
/// ```
///
/// # Flow
///
/// 1. Read the token from the `token` cookie, then the `Authorization` header
/// 2. Verify its signature with [`crate::application::services::AuthService`]
/// 3. On a missing or invalid token, issue a new owner id
/// 4. Insert the [`Owner`] into request extensions for handlers
/// 5. For a newly issued identity, return the token in `Set-Cookie` and
///    `Authorization` response headers
///
/// Never rejects a request. Handlers that need an existing identity check
/// [`Owner::is_new`].
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    let mut token = cookie_token(&parts.headers);
    if token.is_none() {
        token = AuthBearer::from_request_parts(&mut parts, &())
            .await
            .ok()
            .map(|AuthBearer(t)| t);
    }

    let (owner, issued) = match token.as_deref().and_then(|t| st.auth.verify(t)) {
        Some(id) => (Owner { id, is_new: false }, None),
        None => {
            let (owner, token) = st.auth.issue();
            tracing::debug!(owner_id = %owner.id, "Issued owner token");
            (owner, Some(token))
        }
    };

    parts.extensions.insert(owner);
    let mut response = next.run(Request::from_parts(parts, body)).await;

    if let Some(token) = issued {
        let headers = response.headers_mut();
        if let Ok(cookie) =
            HeaderValue::from_str(&format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"))
        {
            headers.append(header::SET_COOKIE, cookie);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(header::AUTHORIZATION, bearer);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_token_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def; lang=en"),
        );

        assert_eq!(cookie_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_cookie_token_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tokenx=1"));

        assert_eq!(cookie_token(&headers), None);
    }
}
