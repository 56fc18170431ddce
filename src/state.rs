//! Shared application state.

use std::sync::Arc;

use sqlx::types::ipnetwork::IpNetwork;

use crate::application::services::{AuthService, ShortenerService};

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub auth: Arc<AuthService>,
    /// Prefix of returned short URLs, without a trailing slash.
    pub base_url: Arc<str>,
    pub trusted_subnet: Option<IpNetwork>,
}

impl AppState {
    pub fn new(
        shortener: Arc<ShortenerService>,
        auth: Arc<AuthService>,
        base_url: &str,
        trusted_subnet: Option<IpNetwork>,
    ) -> Self {
        Self {
            shortener,
            auth,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            trusted_subnet,
        }
    }

    /// Full short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
