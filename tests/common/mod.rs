#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use urlcut::application::services::{AuthService, ShortenerService};
use urlcut::domain::deletion_worker::DeletionSettings;
use urlcut::domain::error::StorageError;
use urlcut::domain::repositories::UrlRepository;
use urlcut::infrastructure::persistence::MemoryUrlRepository;
use urlcut::routes::api_router;
use urlcut::state::AppState;
use urlcut::utils::code_generator::RandomCodeGenerator;

pub const BASE_URL: &str = "http://localhost:8080";
pub const SIGNING_SECRET: &str = "test-signing-secret";

pub fn create_test_state() -> (AppState, Arc<MemoryUrlRepository>) {
    let repo = Arc::new(MemoryUrlRepository::new());

    let shortener = ShortenerService::new(
        repo.clone(),
        Arc::new(RandomCodeGenerator::default()),
        DeletionSettings::default(),
    );
    let auth = AuthService::new(SIGNING_SECRET.to_string());

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(auth),
        BASE_URL,
        Some("10.0.0.0/8".parse().unwrap()),
    );

    (state, repo)
}

pub fn create_test_server() -> (TestServer, AppState, Arc<MemoryUrlRepository>) {
    let (state, repo) = create_test_state();
    let server = TestServer::new(api_router(state.clone())).unwrap();
    (server, state, repo)
}

pub fn bearer(state: &AppState, owner_id: &str) -> String {
    format!("Bearer {}", state.auth.sign(owner_id))
}

/// Strips the base URL from a returned short URL.
pub fn code_of(short_url: &str) -> String {
    short_url
        .strip_prefix(&format!("{BASE_URL}/"))
        .unwrap_or_else(|| panic!("unexpected short url {short_url}"))
        .to_string()
}

/// Waits until a background deletion has marked `code` as gone.
pub async fn wait_until_gone(repo: &MemoryUrlRepository, code: &str) {
    for _ in 0..100 {
        if matches!(repo.get_original_url(code).await, Err(StorageError::Gone(_))) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{code} was not deleted in time");
}
